use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use crate::CliError;

/// Route JSON tracing output into the run directory's log file.
pub fn init_run_logging(path: &Path) -> Result<(), CliError> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .json()
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}
