use fabrica_core::{GenRng, Scope, Value};
use fabrica_dict::Dictionary;
use fabrica_generate::{
    CountRange, Field, FieldArgs, FieldKind, GenContext, Generator, GeneratorArena, TestEmitter,
};

fn draw(field: &Field, rng: &mut GenRng) -> Value {
    let arena = GeneratorArena::new();
    let dict = Dictionary::with_defaults();
    let mut ctx = GenContext {
        arena: &arena,
        dict: &dict,
        rng,
    };
    let mut emitter = TestEmitter::new();
    let scope = Scope::root();
    field
        .generate_value(&mut ctx, None, &mut emitter, &scope)
        .expect("field generates")
}

fn possibilities(field: &Field) -> i64 {
    let arena = GeneratorArena::new();
    let dict = Dictionary::with_defaults();
    field.number_of_possibilities(&arena, &dict)
}

#[test]
fn integer_draws_stay_in_bounds() {
    let field = Field::new(FieldKind::Integer { min: 1, max: 10 }, None, false);
    let mut rng = GenRng::seed_from_u64(42);
    let mut saw_min = false;
    let mut saw_max = false;
    for _ in 0..1000 {
        let value = draw(&field, &mut rng).as_i64().expect("integer");
        assert!((1..=10).contains(&value), "out of range: {value}");
        saw_min |= value == 1;
        saw_max |= value == 10;
    }
    assert!(saw_min && saw_max, "1000 draws should cover both bounds");
}

#[test]
fn float_draws_stay_in_bounds() {
    let field = Field::new(
        FieldKind::Float {
            min: 4.25,
            max: 4.3,
        },
        None,
        false,
    );
    let mut rng = GenRng::seed_from_u64(1);
    for _ in 0..100 {
        let value = draw(&field, &mut rng).as_f64().expect("float");
        assert!((4.25..=4.3).contains(&value), "out of range: {value}");
    }
}

#[test]
fn string_draws_have_length_and_alphabet() {
    let field = Field::new(FieldKind::String { length: 8 }, None, false);
    let mut rng = GenRng::seed_from_u64(9);
    for _ in 0..100 {
        let value = draw(&field, &mut rng);
        let text = value.as_str().expect("string");
        assert_eq!(text.len(), 8);
        assert!(text.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

#[test]
fn date_draws_format_within_bounds() {
    let mut generator = Generator::new("Sample", None, true);
    generator
        .with_field(
            "born",
            "date",
            FieldArgs::DateRange(
                chrono::DateTime::parse_from_rfc3339("1945-01-01T00:00:00Z")
                    .unwrap()
                    .with_timezone(&chrono::Utc),
                chrono::DateTime::parse_from_rfc3339("1945-12-31T00:00:00Z")
                    .unwrap()
                    .with_timezone(&chrono::Utc),
                "%Y-%m-%d".to_string(),
            ),
            None,
            false,
        )
        .expect("valid date field");

    let field = generator.field("born").expect("field exists");
    let mut rng = GenRng::seed_from_u64(4);
    for _ in 0..100 {
        let value = draw(field, &mut rng);
        let text = value.as_str().expect("formatted date");
        assert!(text.starts_with("1945-"), "outside bounds: {text}");
    }
}

#[test]
fn enum_draws_come_from_the_value_list() {
    let values = vec![
        Value::Text("one".to_string()),
        Value::Text("two".to_string()),
        Value::Text("three".to_string()),
    ];
    let field = Field::new(
        FieldKind::Enum {
            values: values.clone(),
        },
        None,
        false,
    );
    let mut rng = GenRng::seed_from_u64(6);
    for _ in 0..50 {
        let value = draw(&field, &mut rng);
        assert!(values.contains(&value), "unexpected draw: {value:?}");
    }
}

#[test]
fn multi_value_counts_draw_lists() {
    let field = Field::new(
        FieldKind::Integer { min: 1, max: 10 },
        Some(CountRange::exact(3)),
        false,
    );
    let mut rng = GenRng::seed_from_u64(2);
    match draw(&field, &mut rng) {
        Value::List(values) => assert_eq!(values.len(), 3),
        other => panic!("expected a list, got {other:?}"),
    }

    let ranged = Field::new(
        FieldKind::Integer { min: 1, max: 10 },
        Some(CountRange { min: 2, max: 5 }),
        false,
    );
    for _ in 0..50 {
        match draw(&ranged, &mut rng) {
            Value::List(values) => {
                assert!((2..=5).contains(&values.len()), "bad count {}", values.len())
            }
            other => panic!("expected a list, got {other:?}"),
        }
    }
}

#[test]
fn serial_fields_count_up_from_one() {
    let mut generator = Generator::new("Ticket", None, true);
    generator
        .with_field("n", "serial", FieldArgs::None, None, false)
        .expect("serial field");
    let field = generator.field("n").expect("field exists");
    let mut rng = GenRng::seed_from_u64(0);
    for expected in 1..=5 {
        assert_eq!(draw(field, &mut rng), Value::Int(expected));
    }
}

#[test]
fn uid_draws_are_24_hex_chars_and_unique() {
    let field = Field::new(FieldKind::Uid, None, false);
    let mut rng = GenRng::seed_from_u64(12);
    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..100 {
        let value = draw(&field, &mut rng);
        let text = value.as_str().expect("uid").to_string();
        assert_eq!(text.len(), 24);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(seen.insert(text), "duplicate uid");
    }
}

#[test]
fn possibility_counts_match_the_table() {
    assert_eq!(
        possibilities(&Field::new(FieldKind::Integer { min: 1, max: 10 }, None, true)),
        10
    );
    assert_eq!(
        possibilities(&Field::new(FieldKind::String { length: 5 }, None, true)),
        62_i64.pow(5)
    );
    // 62^11 overflows an i64: effectively infinite
    assert_eq!(
        possibilities(&Field::new(FieldKind::String { length: 11 }, None, true)),
        -1
    );
    assert_eq!(
        possibilities(&Field::new(
            FieldKind::Float { min: 1.0, max: 2.0 },
            None,
            true
        )),
        -1
    );
    assert_eq!(
        possibilities(&Field::new(
            FieldKind::Float { min: 1.0, max: 1.0 },
            None,
            true
        )),
        1
    );
    assert_eq!(possibilities(&Field::new(FieldKind::Bool, None, false)), 2);
    assert_eq!(possibilities(&Field::new(FieldKind::Uid, None, false)), -1);
    assert_eq!(
        possibilities(&Field::new(
            FieldKind::Enum {
                values: vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
            },
            None,
            true
        )),
        4
    );
    assert_eq!(
        possibilities(&Field::new(
            FieldKind::Dict {
                category: "name_prefixes".to_string()
            },
            None,
            true
        )),
        5
    );
}

#[test]
fn one_day_date_range_has_86400_possibilities() {
    let min = chrono::DateTime::parse_from_rfc3339("1945-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let max = chrono::DateTime::parse_from_rfc3339("1945-01-02T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let field = Field::new(
        FieldKind::Date {
            min,
            max,
            format: "%Y-%m-%d".to_string(),
        },
        None,
        true,
    );
    assert_eq!(possibilities(&field), 86400);
}

#[test]
fn boolean_fields_cannot_be_unique() {
    let mut generator = Generator::new("Sample", None, true);
    let err = generator
        .with_field("flag", "bool", FieldArgs::None, None, true)
        .unwrap_err();
    assert!(err.to_string().contains("boolean fields cannot be unique"));
}

#[test]
fn serial_fields_reject_counts() {
    let mut generator = Generator::new("Sample", None, true);
    let err = generator
        .with_field(
            "n",
            "serial",
            FieldArgs::None,
            Some(CountRange::exact(2)),
            false,
        )
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("serial fields can only have a single value"));
}

#[test]
fn inverted_bounds_are_rejected() {
    let mut generator = Generator::new("Sample", None, true);
    assert!(generator
        .with_field("n", "integer", FieldArgs::IntRange(10, 1), None, false)
        .is_err());
    assert!(generator
        .with_field("x", "decimal", FieldArgs::FloatRange(2.0, 1.0), None, false)
        .is_err());
}

#[test]
fn argument_shape_mismatches_are_rejected() {
    let mut generator = Generator::new("Sample", None, true);
    let err = generator
        .with_field("s", "string", FieldArgs::Category("oops".to_string()), None, false)
        .unwrap_err();
    assert!(err.to_string().contains("for field s (string)"));

    let err = generator
        .with_field("u", "unknown_kind", FieldArgs::None, None, false)
        .unwrap_err();
    assert!(err.to_string().contains("invalid field type"));
}
