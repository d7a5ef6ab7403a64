//! Run a small inline plan and print the emitted records as JSON lines.

use fabrica_core::{GenRng, Value};
use fabrica_dict::Dictionary;
use fabrica_generate::{FlatEmitter, Interpreter};
use fabrica_plan::parse_document;

const PLAN: &str = r#"{
    "plan_version": "0.1",
    "seed": 1,
    "entities": [
        {"name": "Pet", "fields": [
            {"name": "name", "type": "dict", "category": "first_names"}
        ]},
        {"name": "Owner", "fields": [
            {"name": "pet", "type": "entity", "entity": "Pet"},
            {"name": "age", "type": "integer", "min": 21, "max": 90}
        ]}
    ],
    "generate": [{"entity": "Owner", "count": 3}]
}"#;

fn main() {
    let document = parse_document(PLAN).expect("plan parses");
    let dict = Dictionary::with_defaults();
    let mut rng = GenRng::seed_from_u64(document.seed.unwrap_or(1));
    let mut interpreter = Interpreter::new(document.disable_metadata);
    let mut emitter = FlatEmitter::new();

    interpreter
        .run(&document, &dict, &mut rng, &mut emitter)
        .expect("plan runs");

    let output = emitter.output();
    for (type_tag, record) in output.borrow().records() {
        let json = serde_json::to_string(&Value::Entity(record.clone())).expect("serializes");
        println!("{type_tag}: {json}");
    }
}
