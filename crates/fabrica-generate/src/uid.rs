use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use fabrica_core::GenRng;

static UID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// 12-byte identifier rendered as 24 hex chars: 4-byte unix-seconds
/// prefix, 5 random bytes, 3-byte process counter. Unique within a
/// process run.
pub fn next_uid(rng: &mut GenRng) -> String {
    let secs = Utc::now().timestamp() as u32;
    let mut random = [0_u8; 5];
    rng.fill_bytes(&mut random);
    let count = UID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

    let mut id = format!("{secs:08x}");
    for byte in random {
        id.push_str(&format!("{byte:02x}"));
    }
    id.push_str(&format!("{count:06x}"));
    id
}
