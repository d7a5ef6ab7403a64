use std::rc::Rc;

use fabrica_core::{apply_operator, resolve, Error, Expr, Op, Scope, Value};

#[test]
fn int_arithmetic_stays_integral_except_division() {
    let sum = apply_operator(Op::Add, Value::Int(2), Value::Int(3)).expect("add");
    assert_eq!(sum, Value::Int(5));

    let diff = apply_operator(Op::Sub, Value::Int(2), Value::Int(3)).expect("sub");
    assert_eq!(diff, Value::Int(-1));

    let product = apply_operator(Op::Mul, Value::Int(4), Value::Int(5)).expect("mul");
    assert_eq!(product, Value::Int(20));

    let quotient = apply_operator(Op::Div, Value::Int(7), Value::Int(2)).expect("div");
    assert_eq!(quotient, Value::Float(3.5));
}

#[test]
fn mixed_numeric_operands_promote_to_float() {
    let sum = apply_operator(Op::Add, Value::Int(2), Value::Float(0.5)).expect("add");
    assert_eq!(sum, Value::Float(2.5));

    let product = apply_operator(Op::Mul, Value::Float(1.5), Value::Int(4)).expect("mul");
    assert_eq!(product, Value::Float(6.0));
}

#[test]
fn string_concatenation_uses_canonical_formatting() {
    let joined = apply_operator(
        Op::Add,
        Value::Text("n=".to_string()),
        Value::Int(42),
    )
    .expect("concat");
    assert_eq!(joined, Value::Text("n=42".to_string()));

    let joined = apply_operator(Op::Add, Value::Float(2.5), Value::Text("x".to_string()))
        .expect("concat");
    assert_eq!(joined, Value::Text("2.5x".to_string()));

    let joined = apply_operator(Op::Add, Value::Bool(true), Value::Text("!".to_string()))
        .expect("concat");
    assert_eq!(joined, Value::Text("true!".to_string()));
}

#[test]
fn string_subtraction_is_incompatible() {
    let err = apply_operator(
        Op::Sub,
        Value::Text("a".to_string()),
        Value::Text("b".to_string()),
    )
    .unwrap_err();
    match err {
        Error::Type(message) => {
            assert_eq!(message, "Incompatible types for operator \"-\"");
        }
        other => panic!("expected type error, got {other:?}"),
    }
}

#[test]
fn string_replication_by_integer() {
    let repeated = apply_operator(Op::Mul, Value::Int(3), Value::Text("ab".to_string()))
        .expect("replicate");
    assert_eq!(repeated, Value::Text("ababab".to_string()));

    let repeated = apply_operator(Op::Mul, Value::Text("ab".to_string()), Value::Int(2))
        .expect("replicate");
    assert_eq!(repeated, Value::Text("abab".to_string()));

    let empty = apply_operator(Op::Mul, Value::Int(0), Value::Text("ab".to_string()))
        .expect("replicate");
    assert_eq!(empty, Value::Text(String::new()));
}

#[test]
fn string_replication_by_negative_fails() {
    let err = apply_operator(Op::Mul, Value::Int(-1), Value::Text("ab".to_string()))
        .unwrap_err();
    match err {
        Error::Type(message) => {
            assert_eq!(message, "Cannot multiply string by negative number");
        }
        other => panic!("expected type error, got {other:?}"),
    }
}

#[test]
fn float_multiplier_truncates_before_replication() {
    let repeated = apply_operator(Op::Mul, Value::Float(2.9), Value::Text("x".to_string()))
        .expect("replicate");
    assert_eq!(repeated, Value::Text("xx".to_string()));
}

#[test]
fn string_division_is_incompatible() {
    let err = apply_operator(Op::Div, Value::Text("ab".to_string()), Value::Int(2))
        .unwrap_err();
    assert!(matches!(err, Error::Type(_)));
}

#[test]
fn deferred_operand_defers_the_whole_expression() {
    let lhs = Value::Deferred(Rc::new(Expr::Ref("first".to_string())));
    let combined =
        apply_operator(Op::Add, lhs, Value::Text("!".to_string())).expect("defer");
    assert!(combined.is_deferred());

    let scope = Scope::root();
    scope.set("first", Value::Text("Ada".to_string()));
    let Value::Deferred(expr) = combined else {
        panic!("expected deferred value");
    };
    let resolved = resolve(&expr, &scope).expect("resolve");
    assert_eq!(resolved, Value::Text("Ada!".to_string()));
}

#[test]
fn chained_deferred_expressions_resolve_transitively() {
    // full = first + (" " + last), both sides deferred
    let space_last = apply_operator(
        Op::Add,
        Value::Text(" ".to_string()),
        Value::Deferred(Rc::new(Expr::Ref("last".to_string()))),
    )
    .expect("defer rhs");
    let full = apply_operator(
        Op::Add,
        Value::Deferred(Rc::new(Expr::Ref("first".to_string()))),
        space_last,
    )
    .expect("defer lhs");

    let scope = Scope::root();
    scope.set("first", Value::Text("Grace".to_string()));
    scope.set("last", Value::Text("Hopper".to_string()));

    let Value::Deferred(expr) = full else {
        panic!("expected deferred value");
    };
    assert_eq!(
        resolve(&expr, &scope).expect("resolve"),
        Value::Text("Grace Hopper".to_string())
    );
}

#[test]
fn unresolved_symbol_is_a_resolution_error() {
    let scope = Scope::root();
    let err = resolve(&Expr::Ref("missing".to_string()), &scope).unwrap_err();
    assert!(matches!(err, Error::Resolution(_)));
}

#[test]
fn incompatible_operands_report_the_operator() {
    let err = apply_operator(Op::Sub, Value::Bool(true), Value::Bool(false)).unwrap_err();
    match err {
        Error::Type(message) => {
            assert!(message.contains("\"-\""), "unexpected message: {message}");
        }
        other => panic!("expected type error, got {other:?}"),
    }
}
