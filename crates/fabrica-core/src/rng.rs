use chrono::{DateTime, TimeZone, Utc};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seedable random source threaded through the generation pipeline.
///
/// One generation run draws from a single `GenRng`; seeding it makes the
/// run deterministic.
#[derive(Debug, Clone)]
pub struct GenRng {
    inner: ChaCha8Rng,
}

impl GenRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// Uniform integer in `[0, n)`. `n` must be positive.
    pub fn int_n(&mut self, n: i64) -> i64 {
        self.inner.gen_range(0..n)
    }

    /// Uniform integer in `[min, max]` inclusive.
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        self.inner.gen_range(min..=max)
    }

    /// Uniform float in `[0, 1)`.
    pub fn float01(&mut self) -> f64 {
        self.inner.gen_range(0.0..1.0)
    }

    /// `min + U * (max - min)`.
    pub fn float_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.float01() * (max - min)
    }

    pub fn bool(&mut self) -> bool {
        self.int_n(2) == 0
    }

    /// Standard normal draw truncated to `[-3, 3]` (Box-Muller, resampled
    /// outside the truncation window).
    pub fn normal(&mut self) -> f64 {
        loop {
            let u1: f64 = self.inner.gen_range(f64::EPSILON..1.0);
            let u2: f64 = self.float01();
            let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
            if z.abs() <= 3.0 {
                return z;
            }
        }
    }

    /// Uniform instant between `min` and `max` inclusive, whole seconds.
    pub fn instant_between(&mut self, min: DateTime<Utc>, max: DateTime<Utc>) -> DateTime<Utc> {
        let secs = self.int_range(min.timestamp(), max.timestamp());
        Utc.timestamp_opt(secs, 0).single().unwrap_or(min)
    }

    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }
}
