use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use fabrica_core::{Record, Result, Value};

/// Write records as one JSON object per line.
pub fn write_records_jsonl(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        let value = Value::Entity(Rc::clone(record));
        let line = serde_json::to_string(&value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
