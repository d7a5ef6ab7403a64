use std::rc::Rc;

use chrono::{DateTime, Utc};
use fabrica_core::{Result, Scope, Value};
use fabrica_dict::Dictionary;

use crate::emitter::Emitter;
use crate::field_kind::FieldKind;
use crate::generator::{GenContext, GeneratorArena};

/// Inclusive multi-value count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
    pub min: i64,
    pub max: i64,
}

impl CountRange {
    pub fn exact(count: i64) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    fn draw(&self, ctx: &mut GenContext<'_>) -> i64 {
        if self.min == self.max {
            self.min
        } else {
            ctx.rng.int_range(self.min, self.max)
        }
    }
}

/// Typed arguments for `Generator::with_field`; the accepted shape
/// depends on the field kind tag.
#[derive(Debug, Clone)]
pub enum FieldArgs {
    None,
    Length(i64),
    IntRange(i64, i64),
    FloatRange(f64, f64),
    DateRange(DateTime<Utc>, DateTime<Utc>, String),
    Category(String),
    Values(Vec<Value>),
}

/// A named producer attached to a generator: a `FieldKind` plus the
/// multi-value count range and the uniqueness flag.
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    count: Option<CountRange>,
    unique_value: bool,
}

impl Field {
    pub fn new(kind: FieldKind, count: Option<CountRange>, unique_value: bool) -> Self {
        Self {
            kind,
            count,
            unique_value,
        }
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.kind_name()
    }

    pub fn count(&self) -> Option<CountRange> {
        self.count
    }

    pub fn unique_value(&self) -> bool {
        self.unique_value
    }

    pub fn uniquable(&self) -> bool {
        self.kind.uniquable()
    }

    pub fn multi_value(&self) -> bool {
        self.count.is_some()
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.kind, FieldKind::Deferred { .. })
    }

    /// Produce this field's value: a single draw, or a list of `n`
    /// independent draws with `n` uniform in the count range.
    pub fn generate_value(
        &self,
        ctx: &mut GenContext<'_>,
        parent_id: Option<&Value>,
        emitter: &mut dyn Emitter,
        scope: &Rc<Scope>,
    ) -> Result<Value> {
        match self.count {
            None => self.kind.one(ctx, parent_id, emitter, scope),
            Some(range) => {
                let n = range.draw(ctx);
                let mut values = Vec::with_capacity(n.max(0) as usize);
                for _ in 0..n {
                    values.push(self.kind.one(ctx, parent_id, emitter, scope)?);
                }
                Ok(Value::List(values))
            }
        }
    }

    /// Possibility count of a single draw; the count range is ignored.
    pub fn number_of_possibilities(&self, arena: &GeneratorArena, dict: &Dictionary) -> i64 {
        self.kind.possibilities(arena, dict)
    }
}
