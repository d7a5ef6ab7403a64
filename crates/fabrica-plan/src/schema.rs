use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::Document;

/// JSON Schema for plan documents.
pub fn document_json_schema() -> RootSchema {
    schema_for!(Document)
}
