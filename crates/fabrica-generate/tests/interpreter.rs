use fabrica_core::{Error, GenRng, Value};
use fabrica_dict::Dictionary;
use fabrica_generate::{FlatEmitter, GenerationReport, Interpreter, NestedEmitter, TestEmitter};
use fabrica_plan::parse_document;

fn run_plan(text: &str, emitter: &mut dyn fabrica_generate::Emitter) -> Result<(), Error> {
    let document = parse_document(text).expect("plan parses");
    let dict = Dictionary::with_defaults();
    let mut rng = GenRng::seed_from_u64(99);
    let mut interpreter = Interpreter::new(document.disable_metadata);
    interpreter.run(&document, &dict, &mut rng, emitter)
}

#[test]
fn builds_and_runs_a_plan_document() {
    let plan = r#"{
        "plan_version": "0.1",
        "entities": [
            {"name": "Pet", "fields": [
                {"name": "name", "type": "string", "length": 5}
            ]},
            {"name": "Owner", "fields": [
                {"name": "pet", "type": "entity", "entity": "Pet"},
                {"name": "age", "type": "integer", "min": 21, "max": 90},
                {"name": "first", "type": "string", "length": 4},
                {"name": "greeting", "type": "expr",
                 "expr": {"op": "+", "lhs": {"lit": "Hi "}, "rhs": {"ref": "first"}}}
            ]}
        ],
        "generate": [{"entity": "Owner", "count": 3}]
    }"#;

    let mut emitter = FlatEmitter::new();
    run_plan(plan, &mut emitter).expect("plan runs");

    let output = emitter.output();
    let output = output.borrow();
    let by_type = output.by_type();
    assert_eq!(by_type.get("Pet").map(Vec::len), Some(3));
    assert_eq!(by_type.get("Owner").map(Vec::len), Some(3));

    for owner in by_type.get("Owner").unwrap() {
        let owner = owner.borrow();
        let age = owner.get("age").and_then(|v| v.as_i64()).expect("age");
        assert!((21..=90).contains(&age));
        let first = owner.get("first").and_then(|v| v.as_str()).expect("first");
        let greeting = owner
            .get("greeting")
            .and_then(|v| v.as_str())
            .expect("greeting");
        assert_eq!(greeting, format!("Hi {first}"));
        assert_eq!(
            owner.get("$type"),
            Some(&Value::Text("Owner".to_string()))
        );
    }
}

#[test]
fn serial_pkeys_continue_through_plan_inheritance() {
    let plan = r#"{
        "plan_version": "0.1",
        "entities": [
            {"name": "A", "pkey": {"name": "id", "kind": "serial"}, "fields": []},
            {"name": "B", "extends": "A", "fields": []}
        ],
        "generate": [
            {"entity": "A", "count": 3},
            {"entity": "B", "count": 2}
        ]
    }"#;

    let mut emitter = TestEmitter::new();
    run_plan(plan, &mut emitter).expect("plan runs");

    let mut ids = Vec::new();
    while let Some((_, record)) = emitter.shift() {
        ids.push(record.borrow().get("id").cloned().expect("serial id"));
    }
    assert_eq!(
        ids,
        vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::Int(4),
            Value::Int(5)
        ]
    );
}

#[test]
fn argument_less_fields_take_default_arguments() {
    let plan = r#"{
        "plan_version": "0.1",
        "entities": [
            {"name": "Sample", "fields": [
                {"name": "code", "type": "string"},
                {"name": "n", "type": "integer"},
                {"name": "x", "type": "decimal"},
                {"name": "born", "type": "date"}
            ]}
        ],
        "generate": [{"entity": "Sample", "count": 5}]
    }"#;

    let mut emitter = TestEmitter::new();
    run_plan(plan, &mut emitter).expect("plan runs");

    while let Some((_, record)) = emitter.shift() {
        let record = record.borrow();
        let code = record.get("code").and_then(|v| v.as_str()).expect("code");
        assert_eq!(code.len(), 5);
        let n = record.get("n").and_then(|v| v.as_i64()).expect("n");
        assert!((1..=10).contains(&n));
        let born = record.get("born").and_then(|v| v.as_str()).expect("born");
        assert_eq!(born.len(), "1970-01-01".len());
    }
}

#[test]
fn unresolved_parents_are_resolution_errors() {
    let plan = r#"{
        "plan_version": "0.1",
        "entities": [{"name": "B", "extends": "Nope", "fields": []}],
        "generate": []
    }"#;

    let mut emitter = TestEmitter::new();
    let err = run_plan(plan, &mut emitter).unwrap_err();
    match err {
        Error::Resolution(message) => {
            assert!(message.contains("Nope"), "unexpected message: {message}")
        }
        other => panic!("expected resolution error, got {other:?}"),
    }
}

#[test]
fn unique_feasibility_failures_abort_the_run() {
    let plan = r#"{
        "plan_version": "0.1",
        "entities": [
            {"name": "Paint", "fields": [
                {"name": "color", "type": "enum", "values": ["r", "g", "b"], "unique": true}
            ]}
        ],
        "generate": [{"entity": "Paint", "count": 4}]
    }"#;

    let mut emitter = TestEmitter::new();
    let err = run_plan(plan, &mut emitter).unwrap_err();
    assert!(err.to_string().contains("color"));
    assert!(emitter.is_empty(), "nothing should have been emitted");
}

#[test]
fn anonymous_inline_entities_get_namespaced_names() {
    let plan = r#"{
        "plan_version": "0.1",
        "entities": [
            {"name": "Owner", "fields": [
                {"name": "pet", "type": "entity", "entity":
                    {"fields": [{"name": "name", "type": "string", "length": 3}]}}
            ]}
        ],
        "generate": [{"entity": "Owner", "count": 1}]
    }"#;

    let mut emitter = TestEmitter::new();
    run_plan(plan, &mut emitter).expect("plan runs");

    let (pet_type, pet_record) = emitter.shift().expect("pet first");
    assert_eq!(pet_type, "$1");
    assert!(pet_record.borrow().contains_key("$parent"));
    let (owner_type, _) = emitter.shift().expect("owner second");
    assert_eq!(owner_type, "Owner");
}

#[test]
fn reports_count_sub_entity_types_too() {
    let plan = r#"{
        "plan_version": "0.1",
        "entities": [
            {"name": "Pet", "fields": []},
            {"name": "Owner", "fields": [
                {"name": "pet", "type": "entity", "entity": "Pet"}
            ]}
        ],
        "generate": [{"entity": "Owner", "count": 3}]
    }"#;

    let mut emitter = FlatEmitter::new();
    run_plan(plan, &mut emitter).expect("plan runs");

    let output = emitter.output();
    let report = GenerationReport::from_output("run".to_string(), &output.borrow());
    assert_eq!(report.records_total, 6);

    let count_for = |declared_type: &str| {
        report
            .types
            .iter()
            .find(|entry| entry.declared_type == declared_type)
            .map(|entry| entry.records)
    };
    assert_eq!(count_for("Owner"), Some(3));
    assert_eq!(count_for("Pet"), Some(3));
}

#[test]
fn nested_emission_embeds_sub_entities() {
    let plan = r#"{
        "plan_version": "0.1",
        "entities": [
            {"name": "Pet", "fields": [
                {"name": "name", "type": "string", "length": 5}
            ]},
            {"name": "Owner", "fields": [
                {"name": "pet", "type": "entity", "entity": "Pet"}
            ]}
        ],
        "generate": [{"entity": "Owner", "count": 1}]
    }"#;

    let mut emitter = NestedEmitter::new();
    run_plan(plan, &mut emitter).expect("plan runs");

    let output = emitter.output();
    let output = output.borrow();
    assert_eq!(output.len(), 1, "only the owner reaches the output");
    let (type_tag, owner) = &output.records()[0];
    assert_eq!(type_tag, "Owner");
    let owner = owner.borrow();
    match owner.get("pet") {
        Some(Value::Entity(pet)) => {
            assert!(pet.borrow().contains_key("name"));
        }
        other => panic!("expected embedded pet, got {other:?}"),
    }
}

#[test]
fn multi_count_entity_fields_collect_id_lists() {
    let plan = r#"{
        "plan_version": "0.1",
        "entities": [
            {"name": "Pet", "fields": []},
            {"name": "Owner", "fields": [
                {"name": "pets", "type": "entity", "entity": "Pet", "count": 3}
            ]}
        ],
        "generate": [{"entity": "Owner", "count": 1}]
    }"#;

    let mut emitter = FlatEmitter::new();
    run_plan(plan, &mut emitter).expect("plan runs");

    let output = emitter.output();
    let output = output.borrow();
    let by_type = output.by_type();
    assert_eq!(by_type.get("Pet").map(Vec::len), Some(3));
    let owner = by_type.get("Owner").unwrap()[0].borrow();
    match owner.get("pets") {
        Some(Value::List(ids)) => assert_eq!(ids.len(), 3),
        other => panic!("expected id list, got {other:?}"),
    }
}
