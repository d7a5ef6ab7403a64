use serde::{Deserialize, Serialize};

use crate::emitter::GenerationOutput;

/// Per-type record count for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeReport {
    pub declared_type: String,
    pub records: u64,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub types: Vec<TypeReport>,
    pub records_total: u64,
}

impl GenerationReport {
    /// Tally the emitted records per declared type. Sub-entity types
    /// reach the output alongside the requested ones, so counting here
    /// covers both.
    pub fn from_output(run_id: String, output: &GenerationOutput) -> Self {
        let mut types = Vec::new();
        let mut records_total = 0;
        for (declared_type, records) in output.by_type() {
            records_total += records.len() as u64;
            types.push(TypeReport {
                declared_type,
                records: records.len() as u64,
            });
        }
        Self {
            run_id,
            types,
            records_total,
        }
    }
}
