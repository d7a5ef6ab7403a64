use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fabrica_core::{apply_operator, Error, Expr, GenRng, Op, Result, Scope, Value};
use fabrica_dict::Dictionary;
use fabrica_plan::{
    CountDecl, Document, EntityDecl, EntityRef, ExprDecl, FieldDecl, FieldKindDecl, PkeyDecl,
    PkeyKindDecl,
};

use crate::emitter::Emitter;
use crate::field::{CountRange, FieldArgs};
use crate::generator::{GenContext, Generator, GeneratorArena};
use crate::pkey::{PkeyKind, PrimaryKey};

const DEFAULT_STRING_LENGTH: i64 = 5;
const DEFAULT_INT_BOUNDS: (i64, i64) = (1, 10);
const DEFAULT_FLOAT_BOUNDS: (f64, f64) = (1.0, 10.0);
const DEFAULT_DATE_MIN: (i32, u32, u32) = (1945, 1, 1);
const DEFAULT_DATE_MAX: (i32, u32, u32) = (2017, 1, 1);
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-key counter handing out formal names for anonymous entities.
#[derive(Debug, Default)]
pub struct NamespaceCounter {
    counters: BTreeMap<String, i64>,
}

impl NamespaceCounter {
    pub fn next(&mut self, key: &str) -> i64 {
        let counter = self.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}

/// Builds the generator arena from a plan document and drives the
/// generate statements.
pub struct Interpreter {
    arena: GeneratorArena,
    anon_names: NamespaceCounter,
    disable_metadata: bool,
}

impl Interpreter {
    pub fn new(disable_metadata: bool) -> Self {
        Self {
            arena: GeneratorArena::new(),
            anon_names: NamespaceCounter::default(),
            disable_metadata,
        }
    }

    pub fn arena(&self) -> &GeneratorArena {
        &self.arena
    }

    /// Build every entity declaration, then run every generate statement
    /// through `emitter`.
    pub fn run(
        &mut self,
        document: &Document,
        dict: &Dictionary,
        rng: &mut GenRng,
        emitter: &mut dyn Emitter,
    ) -> Result<()> {
        for decl in &document.entities {
            self.entity_from_decl(decl)?;
        }

        let scope = Scope::root();
        for statement in &document.generate {
            let generator = self.resolve_entity_ref(&statement.entity)?;
            if statement.count < 1 {
                return Err(Error::Config(format!(
                    "must generate at least 1 {:?} entity",
                    generator.name()
                )));
            }
            generator.ensure_generatable(statement.count, &self.arena, dict)?;

            let mut ctx = GenContext {
                arena: &self.arena,
                dict,
                rng: &mut *rng,
            };
            generator.generate(statement.count, &mut ctx, emitter, &scope)?;
        }
        Ok(())
    }

    /// Build (and register) a generator from an entity declaration.
    pub fn entity_from_decl(&mut self, decl: &EntityDecl) -> Result<Rc<Generator>> {
        let pkey = decl.pkey.as_ref().map(to_primary_key);
        let mut generator = match &decl.extends {
            Some(parent_name) => {
                let parent = self.arena.get(parent_name).ok_or_else(|| {
                    Error::Resolution(format!(
                        "cannot resolve parent entity {parent_name:?} for entity {:?}",
                        decl.name.as_deref().unwrap_or("<anonymous>")
                    ))
                })?;
                let formal_name = match &decl.name {
                    Some(name) => name.clone(),
                    None => format!("${}::{parent_name}", self.anon_names.next(parent_name)),
                };
                Generator::extend(&formal_name, &parent, pkey, self.disable_metadata)
            }
            None => {
                let formal_name = match &decl.name {
                    Some(name) => name.clone(),
                    None => format!("${}", self.anon_names.next("$")),
                };
                Generator::new(&formal_name, pkey, self.disable_metadata)
            }
        };

        for field in &decl.fields {
            self.install_field(&mut generator, field)?;
        }

        let generator = Rc::new(generator);
        self.arena.insert(Rc::clone(&generator));
        Ok(generator)
    }

    fn resolve_entity_ref(&mut self, reference: &EntityRef) -> Result<Rc<Generator>> {
        match reference {
            EntityRef::Name(name) => self
                .arena
                .get(name)
                .ok_or_else(|| Error::Resolution(format!("cannot resolve entity {name:?}"))),
            EntityRef::Decl(decl) => self.entity_from_decl(decl),
        }
    }

    fn install_field(&mut self, generator: &mut Generator, field: &FieldDecl) -> Result<()> {
        let count = field.count.as_ref().map(to_count_range).transpose()?;
        let name = field.name.as_str();

        match &field.kind {
            FieldKindDecl::String { length } => generator.with_field(
                name,
                "string",
                FieldArgs::Length(length.unwrap_or(DEFAULT_STRING_LENGTH)),
                count,
                field.unique,
            ),
            FieldKindDecl::Integer { min, max } => generator.with_field(
                name,
                "integer",
                FieldArgs::IntRange(
                    min.unwrap_or(DEFAULT_INT_BOUNDS.0),
                    max.unwrap_or(DEFAULT_INT_BOUNDS.1),
                ),
                count,
                field.unique,
            ),
            FieldKindDecl::Decimal { min, max } => generator.with_field(
                name,
                "decimal",
                FieldArgs::FloatRange(
                    min.unwrap_or(DEFAULT_FLOAT_BOUNDS.0),
                    max.unwrap_or(DEFAULT_FLOAT_BOUNDS.1),
                ),
                count,
                field.unique,
            ),
            FieldKindDecl::Date { min, max, format } => {
                let min = min.map(date_to_utc).unwrap_or_else(|| ymd(DEFAULT_DATE_MIN));
                let max = max.map(date_to_utc).unwrap_or_else(|| ymd(DEFAULT_DATE_MAX));
                let format = format.clone().unwrap_or(DEFAULT_DATE_FORMAT.to_string());
                generator.with_field(
                    name,
                    "date",
                    FieldArgs::DateRange(min, max, format),
                    count,
                    field.unique,
                )
            }
            FieldKindDecl::Bool => {
                generator.with_field(name, "bool", FieldArgs::None, count, field.unique)
            }
            FieldKindDecl::Uid => {
                generator.with_field(name, "uid", FieldArgs::None, count, field.unique)
            }
            FieldKindDecl::Serial => {
                generator.with_field(name, "serial", FieldArgs::None, count, field.unique)
            }
            FieldKindDecl::Dict { category } => generator.with_field(
                name,
                "dict",
                FieldArgs::Category(category.clone()),
                count,
                field.unique,
            ),
            FieldKindDecl::Enum { values } => {
                let values = values
                    .iter()
                    .map(json_to_value)
                    .collect::<Result<Vec<_>>>()?;
                generator.with_field(name, "enum", FieldArgs::Values(values), count, field.unique)
            }
            FieldKindDecl::Literal { value } => {
                generator.with_literal_field(name, json_to_value(value)?);
                Ok(())
            }
            FieldKindDecl::Entity { entity } => {
                let child = self.resolve_entity_ref(entity)?;
                generator.with_entity_field(name, child.name(), count);
                Ok(())
            }
            FieldKindDecl::Expr { expr } => match self.build_expr(expr)? {
                Value::Deferred(expr) => {
                    generator.with_deferred_field(name, expr);
                    Ok(())
                }
                value => {
                    generator.with_literal_field(name, value);
                    Ok(())
                }
            },
            FieldKindDecl::Distribution {
                dist,
                weights,
                values,
                domain,
            } => match (values, domain) {
                (Some(values), None) => {
                    let values = values
                        .iter()
                        .map(json_to_value)
                        .collect::<Result<Vec<_>>>()?;
                    generator.with_static_distribution(name, dist, values, weights.clone())
                }
                (None, Some(domain)) => {
                    let args_list = domain
                        .bins
                        .iter()
                        .map(|bin| domain_args(&domain.kind, bin))
                        .collect::<Result<Vec<_>>>()?;
                    generator.with_distribution(name, dist, &domain.kind, args_list, weights.clone())
                }
                _ => Err(Error::Config(format!(
                    "distribution field {name:?} needs exactly one of values or domain"
                ))),
            },
        }
    }

    /// Fold an expression declaration. References stay deferred; a tree
    /// with only concrete leaves folds to a literal at build time.
    fn build_expr(&self, decl: &ExprDecl) -> Result<Value> {
        match decl {
            ExprDecl::Lit { lit } => json_to_value(lit),
            ExprDecl::Ref { reference } => {
                Ok(Value::Deferred(Rc::new(Expr::Ref(reference.clone()))))
            }
            ExprDecl::Binop { op, lhs, rhs } => {
                let op = parse_op(op)?;
                let lhs = self.build_expr(lhs)?;
                let rhs = self.build_expr(rhs)?;
                apply_operator(op, lhs, rhs)
            }
        }
    }
}

fn parse_op(op: &str) -> Result<Op> {
    match op {
        "+" => Ok(Op::Add),
        "-" => Ok(Op::Sub),
        "*" => Ok(Op::Mul),
        "/" => Ok(Op::Div),
        other => Err(Error::Config(format!("unknown operator {other:?}"))),
    }
}

fn to_primary_key(decl: &PkeyDecl) -> PrimaryKey {
    let kind = match decl.kind {
        PkeyKindDecl::Uid => PkeyKind::Uid,
        PkeyKindDecl::Serial => PkeyKind::Serial,
    };
    PrimaryKey::new(&decl.name, kind)
}

fn to_count_range(decl: &CountDecl) -> Result<CountRange> {
    match decl {
        CountDecl::Exact(count) if *count >= 0 => Ok(CountRange::exact(*count)),
        CountDecl::Exact(count) => Err(Error::Config(format!(
            "count {count} cannot be negative"
        ))),
        CountDecl::Range { min, max } => {
            if max < min || *min < 0 {
                return Err(Error::Config(format!(
                    "invalid count range [{min}, {max}]"
                )));
            }
            Ok(CountRange {
                min: *min,
                max: *max,
            })
        }
    }
}

fn json_to_value(value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Bool(value) => Ok(Value::Bool(*value)),
        serde_json::Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Ok(Value::Int(value))
            } else if let Some(value) = number.as_f64() {
                Ok(Value::Float(value))
            } else {
                Err(Error::Config(format!("unsupported number {number}")))
            }
        }
        serde_json::Value::String(value) => Ok(Value::Text(value.clone())),
        serde_json::Value::Array(values) => Ok(Value::List(
            values.iter().map(json_to_value).collect::<Result<Vec<_>>>()?,
        )),
        other => Err(Error::Config(format!("unsupported literal {other}"))),
    }
}

/// Per-bin arguments for a typed distribution domain.
fn domain_args(kind_tag: &str, bin: &serde_json::Value) -> Result<FieldArgs> {
    let get_i64 = |key: &str| bin.get(key).and_then(|value| value.as_i64());
    let get_f64 = |key: &str| bin.get(key).and_then(|value| value.as_f64());
    match kind_tag {
        "string" => get_i64("length")
            .map(FieldArgs::Length)
            .ok_or_else(|| Error::Config(format!("distribution bin {bin} needs a length"))),
        "integer" => match (get_i64("min"), get_i64("max")) {
            (Some(min), Some(max)) => Ok(FieldArgs::IntRange(min, max)),
            _ => Err(Error::Config(format!(
                "distribution bin {bin} needs integer min and max"
            ))),
        },
        "decimal" => match (get_f64("min"), get_f64("max")) {
            (Some(min), Some(max)) => Ok(FieldArgs::FloatRange(min, max)),
            _ => Err(Error::Config(format!(
                "distribution bin {bin} needs decimal min and max"
            ))),
        },
        "date" => {
            let parse = |key: &str| {
                bin.get(key)
                    .and_then(|value| value.as_str())
                    .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
                    .map(date_to_utc)
            };
            match (parse("min"), parse("max")) {
                (Some(min), Some(max)) => {
                    let format = bin
                        .get("format")
                        .and_then(|value| value.as_str())
                        .unwrap_or(DEFAULT_DATE_FORMAT)
                        .to_string();
                    Ok(FieldArgs::DateRange(min, max, format))
                }
                _ => Err(Error::Config(format!(
                    "distribution bin {bin} needs date min and max"
                ))),
            }
        }
        "dict" => bin
            .get("category")
            .and_then(|value| value.as_str())
            .map(|category| FieldArgs::Category(category.to_string()))
            .ok_or_else(|| Error::Config(format!("distribution bin {bin} needs a category"))),
        other => Err(Error::Config(format!(
            "unsupported distribution domain {other:?}"
        ))),
    }
}

fn date_to_utc(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&midnight)
}

fn ymd((year, month, day): (i32, u32, u32)) -> DateTime<Utc> {
    date_to_utc(NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default())
}
