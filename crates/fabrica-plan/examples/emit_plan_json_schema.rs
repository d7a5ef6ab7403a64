//! Print the JSON Schema for plan documents.

fn main() {
    let schema = fabrica_plan::document_json_schema();
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to serialize schema: {err}"),
    }
}
