use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::value::Value;

/// Arithmetic/concatenation operator of a deferred expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A deferred expression: a small tree of literals, symbol references,
/// and binary operations, resolved against a scope in Phase 2.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Lit(Value),
    Ref(String),
    Binop {
        op: Op,
        lhs: Rc<Expr>,
        rhs: Rc<Expr>,
    },
}

/// Resolve an expression against `scope`, producing a concrete value.
///
/// Symbol references may name a value that is itself deferred (a chained
/// deferred expression); those resolve recursively in the same scope.
pub fn resolve(expr: &Expr, scope: &Scope) -> Result<Value> {
    match expr {
        Expr::Lit(value) => Ok(value.clone()),
        Expr::Ref(name) => match scope.resolve(name) {
            Some(Value::Deferred(inner)) => resolve(&inner, scope),
            Some(value) => Ok(value),
            None => Err(Error::Resolution(format!(
                "cannot resolve symbol {name:?}"
            ))),
        },
        Expr::Binop { op, lhs, rhs } => {
            let lhs = resolve(lhs, scope)?;
            let rhs = resolve(rhs, scope)?;
            apply_operator(*op, lhs, rhs)
        }
    }
}

/// Combine two operands under `op`.
///
/// If either side is deferred the result is a new deferred expression
/// that re-applies the operator once both sides are concrete.
pub fn apply_operator(op: Op, lhs: Value, rhs: Value) -> Result<Value> {
    if lhs.is_deferred() || rhs.is_deferred() {
        return Ok(Value::Deferred(Rc::new(Expr::Binop {
            op,
            lhs: as_expr(lhs),
            rhs: as_expr(rhs),
        })));
    }
    match op {
        Op::Add | Op::Sub => additive(op, lhs, rhs),
        Op::Mul | Op::Div => multiplicative(op, lhs, rhs),
    }
}

fn as_expr(value: Value) -> Rc<Expr> {
    match value {
        Value::Deferred(expr) => expr,
        other => Rc::new(Expr::Lit(other)),
    }
}

fn additive(op: Op, lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => Ok(Value::Int(match op {
            Op::Sub => l.saturating_sub(r),
            _ => l.saturating_add(r),
        })),
        (Value::Int(l), Value::Float(r)) => additive(op, Value::Float(l as f64), Value::Float(r)),
        (Value::Float(l), Value::Int(r)) => additive(op, Value::Float(l), Value::Float(r as f64)),
        (Value::Float(l), Value::Float(r)) => Ok(Value::Float(match op {
            Op::Sub => l - r,
            _ => l + r,
        })),
        (Value::Text(l), r) => {
            let repr = r.concat_repr().ok_or_else(|| incompatible(op))?;
            if op == Op::Sub {
                return Err(incompatible(op));
            }
            Ok(Value::Text(l + &repr))
        }
        (l @ (Value::Int(_) | Value::Float(_) | Value::Bool(_)), Value::Text(r)) => {
            if op == Op::Sub {
                return Err(incompatible(op));
            }
            let repr = l.concat_repr().ok_or_else(|| incompatible(op))?;
            Ok(Value::Text(repr + &r))
        }
        _ => Err(incompatible(op)),
    }
}

fn multiplicative(op: Op, lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => match op {
            Op::Div => Ok(Value::Float(l as f64 / r as f64)),
            _ => Ok(Value::Int(l.saturating_mul(r))),
        },
        (Value::Int(l), Value::Float(r)) => {
            multiplicative(op, Value::Float(l as f64), Value::Float(r))
        }
        (Value::Float(l), Value::Int(r)) => {
            multiplicative(op, Value::Float(l), Value::Float(r as f64))
        }
        (Value::Float(l), Value::Float(r)) => match op {
            Op::Div => Ok(Value::Float(l / r)),
            _ => Ok(Value::Float(l * r)),
        },
        (Value::Int(l), Value::Text(r)) => {
            if op == Op::Div {
                return Err(incompatible(op));
            }
            repeat_text(l, &r)
        }
        // A float multiplier truncates to an integer count first.
        (Value::Float(l), Value::Text(r)) => {
            multiplicative(op, Value::Int(l as i64), Value::Text(r))
        }
        (Value::Text(l), Value::Int(r)) => multiplicative(op, Value::Int(r), Value::Text(l)),
        (Value::Text(l), Value::Float(r)) => {
            multiplicative(op, Value::Int(r as i64), Value::Text(l))
        }
        _ => Err(incompatible(op)),
    }
}

fn repeat_text(count: i64, text: &str) -> Result<Value> {
    if count < 0 {
        return Err(Error::Type(
            "Cannot multiply string by negative number".to_string(),
        ));
    }
    Ok(Value::Text(text.repeat(count as usize)))
}

fn incompatible(op: Op) -> Error {
    Error::Type(format!("Incompatible types for operator \"{op}\""))
}
