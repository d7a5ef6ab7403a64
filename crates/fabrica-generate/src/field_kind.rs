use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use fabrica_core::{resolve, Error, Expr, Result, Scope, Value};
use fabrica_dict::Dictionary;

use crate::distribution::Distribution;
use crate::emitter::Emitter;
use crate::field::Field;
use crate::generator::{GenContext, GeneratorArena};
use crate::uid;

/// Alphanumeric alphabet for random strings: 62 glyphs.
const ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// The closed set of field producers.
///
/// Each variant produces one value via `one` and reports its theoretical
/// possibility count, with `-1` standing for "effectively infinite".
#[derive(Debug, Clone)]
pub enum FieldKind {
    String {
        length: i64,
    },
    Integer {
        min: i64,
        max: i64,
    },
    Float {
        min: f64,
        max: f64,
    },
    Bool,
    Date {
        min: DateTime<Utc>,
        max: DateTime<Utc>,
        format: String,
    },
    Enum {
        values: Vec<Value>,
    },
    Dict {
        category: String,
    },
    Uid,
    Serial {
        counter: Rc<Cell<i64>>,
    },
    Literal {
        value: Value,
    },
    /// Sub-entity field; `key` names the child generator in the arena.
    Entity {
        key: String,
    },
    /// Inherited field forwarding to the referred generator's field.
    Reference {
        key: String,
        field: String,
    },
    /// Deferred expression, evaluated against the child scope in Phase 2.
    Deferred {
        expr: Rc<Expr>,
    },
    Distribution {
        bins: Vec<Field>,
        dist: Distribution,
    },
}

impl FieldKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::String { .. } => "string",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Float { .. } => "decimal",
            FieldKind::Bool => "bool",
            FieldKind::Date { .. } => "date",
            FieldKind::Enum { .. } => "enum",
            FieldKind::Dict { .. } => "dict",
            FieldKind::Uid => "uid",
            FieldKind::Serial { .. } => "serial",
            FieldKind::Literal { .. } => "literal",
            FieldKind::Entity { .. } => "entity",
            FieldKind::Reference { .. } => "reference",
            FieldKind::Deferred { .. } => "deferred",
            FieldKind::Distribution { .. } => "distribution",
        }
    }

    /// Whether the variant may carry the `unique` flag.
    pub fn uniquable(&self) -> bool {
        matches!(
            self,
            FieldKind::String { .. }
                | FieldKind::Integer { .. }
                | FieldKind::Float { .. }
                | FieldKind::Date { .. }
                | FieldKind::Dict { .. }
                | FieldKind::Enum { .. }
                | FieldKind::Uid
                | FieldKind::Serial { .. }
        )
    }

    /// Produce one value.
    pub fn one(
        &self,
        ctx: &mut GenContext<'_>,
        parent_id: Option<&Value>,
        emitter: &mut dyn Emitter,
        scope: &Rc<Scope>,
    ) -> Result<Value> {
        match self {
            FieldKind::String { length } => {
                let text: String = (0..*length)
                    .map(|_| ALNUM[ctx.rng.int_n(ALNUM.len() as i64) as usize] as char)
                    .collect();
                Ok(Value::Text(text))
            }
            FieldKind::Integer { min, max } => Ok(Value::Int(ctx.rng.int_range(*min, *max))),
            FieldKind::Float { min, max } => Ok(Value::Float(ctx.rng.float_range(*min, *max))),
            FieldKind::Bool => Ok(Value::Bool(ctx.rng.bool())),
            FieldKind::Date { min, max, format } => {
                let instant = ctx.rng.instant_between(*min, *max);
                Ok(Value::Text(instant.format(format).to_string()))
            }
            FieldKind::Enum { values } => {
                Ok(values[ctx.rng.int_n(values.len() as i64) as usize].clone())
            }
            FieldKind::Dict { category } => Ok(Value::Text(ctx.dict.value(category, ctx.rng))),
            FieldKind::Uid => Ok(Value::Text(uid::next_uid(ctx.rng))),
            FieldKind::Serial { counter } => {
                counter.set(counter.get() + 1);
                Ok(Value::Int(counter.get()))
            }
            FieldKind::Literal { value } => Ok(value.clone()),
            FieldKind::Entity { key } => {
                let child = ctx.arena.get(key).ok_or_else(|| {
                    Error::Resolution(format!("cannot resolve entity generator {key:?}"))
                })?;
                let record = child.one(ctx, parent_id, emitter, scope)?;
                let id = record.borrow().get(child.pkey_name()).cloned();
                id.ok_or_else(|| {
                    Error::Resolution(format!(
                        "entity {key:?} produced no {:?} field",
                        child.pkey_name()
                    ))
                })
            }
            FieldKind::Reference { key, field } => {
                let referred = ctx.arena.get(key).ok_or_else(|| {
                    Error::Resolution(format!("cannot resolve generator {key:?}"))
                })?;
                let referred_field = referred.field(field).ok_or_else(|| {
                    Error::Resolution(format!("generator {key:?} has no field {field:?}"))
                })?;
                referred_field.generate_value(ctx, parent_id, emitter, scope)
            }
            FieldKind::Deferred { expr } => resolve(expr, scope),
            FieldKind::Distribution { bins, dist } => {
                let idx = dist.pick_bin(bins.len(), ctx.rng);
                bins[idx].generate_value(ctx, parent_id, emitter, scope)
            }
        }
    }

    /// Theoretical possibility count; `-1` is effectively infinite.
    pub fn possibilities(&self, arena: &GeneratorArena, dict: &Dictionary) -> i64 {
        match self {
            FieldKind::String { length } => u32::try_from(*length)
                .ok()
                .and_then(|length| 62_i64.checked_pow(length))
                .unwrap_or(-1),
            FieldKind::Integer { min, max } => max - min + 1,
            FieldKind::Float { min, max } => {
                if min == max {
                    1
                } else {
                    -1
                }
            }
            FieldKind::Bool => 2,
            FieldKind::Date { min, max, .. } => (*max - *min).num_seconds(),
            FieldKind::Enum { values } => values.len() as i64,
            FieldKind::Dict { category } => dict.possible_values(category),
            FieldKind::Literal { .. } => 1,
            FieldKind::Entity { key } => match arena.get(key) {
                Some(child) => child
                    .field(child.pkey_name())
                    .map(|field| field.number_of_possibilities(arena, dict))
                    .unwrap_or(-1),
                None => -1,
            },
            FieldKind::Reference { key, field } => match arena.get(key) {
                Some(referred) => referred
                    .field(field)
                    .map(|field| field.number_of_possibilities(arena, dict))
                    .unwrap_or(-1),
                None => -1,
            },
            FieldKind::Uid
            | FieldKind::Serial { .. }
            | FieldKind::Deferred { .. }
            | FieldKind::Distribution { .. } => -1,
        }
    }
}
