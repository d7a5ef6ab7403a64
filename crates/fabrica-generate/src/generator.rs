use std::collections::BTreeMap;
use std::rc::Rc;

use fabrica_core::{new_record, Error, Expr, GenRng, Record, Result, Scope, Value};
use fabrica_dict::Dictionary;

use crate::distribution::Distribution;
use crate::emitter::Emitter;
use crate::field::{CountRange, Field, FieldArgs};
use crate::field_kind::FieldKind;
use crate::pkey::PrimaryKey;

/// Shared collaborators threaded through one generation run.
pub struct GenContext<'a> {
    pub arena: &'a GeneratorArena,
    pub dict: &'a Dictionary,
    pub rng: &'a mut GenRng,
}

/// Name-keyed ownership of all generators in a run.
///
/// Entity and reference fields carry arena keys instead of back-pointers,
/// which keeps the generator graph cycle-free.
#[derive(Debug, Default)]
pub struct GeneratorArena {
    generators: BTreeMap<String, Rc<Generator>>,
}

impl GeneratorArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator under its formal name.
    pub fn insert(&mut self, generator: Rc<Generator>) {
        self.generators
            .insert(generator.name().to_string(), generator);
    }

    pub fn get(&self, key: &str) -> Option<Rc<Generator>> {
        self.generators.get(key).map(Rc::clone)
    }
}

/// An entity template: ordered fields, a primary-key policy, and
/// optional inheritance linkage.
#[derive(Debug)]
pub struct Generator {
    name: String,
    extends: String,
    declared_type: String,
    fields: BTreeMap<String, Field>,
    disable_metadata: bool,
    pkey: PrimaryKey,
}

impl Generator {
    pub fn new(name: &str, pkey: Option<PrimaryKey>, disable_metadata: bool) -> Generator {
        let name = if name.is_empty() { "$" } else { name };
        let mut generator = Generator {
            name: name.to_string(),
            extends: String::new(),
            declared_type: String::new(),
            fields: BTreeMap::new(),
            disable_metadata,
            pkey: pkey.unwrap_or_else(PrimaryKey::default_key),
        };
        generator.recalculate_type();
        if !generator.disable_metadata {
            generator.install_literal("$type", Value::Text(generator.declared_type.clone()));
        }
        generator.pkey.attach(&mut generator.fields);
        generator
    }

    /// Extend `parent`: without an explicit pkey the parent's handle is
    /// reused, so serial sequences continue across parent and child.
    /// Every non-reserved, non-pkey parent field not overridden locally
    /// is inherited as a reference field.
    pub fn extend(
        name: &str,
        parent: &Generator,
        pkey: Option<PrimaryKey>,
        disable_metadata: bool,
    ) -> Generator {
        let pkey = pkey.unwrap_or_else(|| parent.pkey.clone());
        let mut generator = Generator::new(name, Some(pkey), disable_metadata);
        generator.extends = parent.declared_type.clone();
        generator.recalculate_type();

        if !disable_metadata {
            generator.install_literal("$extends", Value::Text(generator.extends.clone()));
            generator.install_literal("$type", Value::Text(generator.declared_type.clone()));
        }

        for (key, field) in &parent.fields {
            if generator.fields.contains_key(key)
                || key.starts_with('$')
                || key == parent.pkey.name()
            {
                continue;
            }
            generator.fields.insert(
                key.clone(),
                Field::new(
                    FieldKind::Reference {
                        key: parent.name.clone(),
                        field: key.clone(),
                    },
                    field.count(),
                    false,
                ),
            );
        }

        generator
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extends(&self) -> &str {
        &self.extends
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn pkey_name(&self) -> &str {
        self.pkey.name()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn recalculate_type(&mut self) {
        self.declared_type = if (self.name.starts_with('$') || self.name.is_empty())
            && !self.extends.is_empty()
        {
            self.extends.clone()
        } else {
            self.name.clone()
        };
    }

    fn install_literal(&mut self, name: &str, value: Value) {
        self.fields.insert(
            name.to_string(),
            Field::new(FieldKind::Literal { value }, None, false),
        );
    }

    pub fn with_literal_field(&mut self, name: &str, value: Value) {
        self.install_literal(name, value);
    }

    pub fn with_deferred_field(&mut self, name: &str, expr: Rc<Expr>) {
        self.fields.insert(
            name.to_string(),
            Field::new(FieldKind::Deferred { expr }, None, false),
        );
    }

    /// Sub-entity field; `entity_key` names the child generator in the
    /// arena.
    pub fn with_entity_field(&mut self, name: &str, entity_key: &str, count: Option<CountRange>) {
        self.fields.insert(
            name.to_string(),
            Field::new(
                FieldKind::Entity {
                    key: entity_key.to_string(),
                },
                count,
                false,
            ),
        );
    }

    /// Typed field from a kind tag plus arguments; validates argument
    /// shapes and bounds.
    pub fn with_field(
        &mut self,
        name: &str,
        kind_tag: &str,
        args: FieldArgs,
        count: Option<CountRange>,
        unique: bool,
    ) -> Result<()> {
        let field = new_typed_field(name, kind_tag, args, count, unique)?;
        self.fields.insert(name.to_string(), field);
        Ok(())
    }

    /// Distribution over literal bins.
    pub fn with_static_distribution(
        &mut self,
        name: &str,
        dist_name: &str,
        values: Vec<Value>,
        weights: Vec<f64>,
    ) -> Result<()> {
        let dist = Distribution::from_name(dist_name, weights);
        if !dist.compatible_domain("literal") {
            return Err(invalid_domain("literal", &dist));
        }
        if !dist.supports_multiple_domains() && values.len() > 1 {
            return Err(Error::Config(
                "distribution does not support multiple domains".to_string(),
            ));
        }
        let bins = values
            .into_iter()
            .map(|value| Field::new(FieldKind::Literal { value }, None, false))
            .collect();
        self.fields.insert(
            name.to_string(),
            Field::new(FieldKind::Distribution { bins, dist }, None, false),
        );
        Ok(())
    }

    /// Distribution over typed producer bins, one argument set per bin.
    /// Domain compatibility is checked against the first bin.
    pub fn with_distribution(
        &mut self,
        name: &str,
        dist_name: &str,
        kind_tag: &str,
        args_list: Vec<FieldArgs>,
        weights: Vec<f64>,
    ) -> Result<()> {
        let dist = Distribution::from_name(dist_name, weights);
        if !dist.supports_multiple_domains() && args_list.len() > 1 {
            return Err(Error::Config(
                "distribution does not support multiple domains".to_string(),
            ));
        }
        let mut bins = Vec::with_capacity(args_list.len());
        for (idx, args) in args_list.into_iter().enumerate() {
            let field = new_typed_field(name, kind_tag, args, None, false)?;
            if idx == 0 && !dist.compatible_domain(field.kind_name()) {
                return Err(invalid_domain(field.kind_name(), &dist));
            }
            bins.push(field);
        }
        self.fields.insert(
            name.to_string(),
            Field::new(FieldKind::Distribution { bins, dist }, None, false),
        );
        Ok(())
    }

    /// Advisory uniqueness feasibility check: fails when a unique field
    /// has fewer finite possibilities than `count`. Uniqueness is not
    /// enforced at draw time.
    pub fn ensure_generatable(
        &self,
        count: i64,
        arena: &GeneratorArena,
        dict: &Dictionary,
    ) -> Result<()> {
        for (name, field) in &self.fields {
            if field.uniquable() && field.unique_value() {
                let possibilities = field.number_of_possibilities(arena, dict);
                if possibilities != -1 && possibilities < count {
                    return Err(Error::Config(format!(
                        "Not enough unique values for field '{name}': There are only \
                         {possibilities} unique values available for the '{name}' field, \
                         and you're trying to generate {count} entities"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Produce `count` entities, returning their primary-key values.
    pub fn generate(
        &self,
        count: i64,
        ctx: &mut GenContext<'_>,
        emitter: &mut dyn Emitter,
        scope: &Rc<Scope>,
    ) -> Result<Vec<Value>> {
        let id_key = self.pkey.name();
        let mut ids = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let entity = self.one(ctx, None, emitter, scope)?;
            let id = entity.borrow().get(id_key).cloned().ok_or_else(|| {
                Error::Resolution(format!("entity {:?} has no {id_key:?} field", self.name))
            })?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Produce one entity.
    ///
    /// The primary key is generated first so it can serve as the parent
    /// id for sub-entities (and so serial counters advance exactly once).
    /// Phase 1 generates every ordinary field; Phase 2 evaluates deferred
    /// fields against the transient scope, where all Phase 1 values are
    /// already published.
    pub fn one(
        &self,
        ctx: &mut GenContext<'_>,
        parent_id: Option<&Value>,
        emitter: &mut dyn Emitter,
        scope: &Rc<Scope>,
    ) -> Result<Record> {
        let entity = new_record();
        let child_scope = Scope::transient(scope, Rc::clone(&entity));

        let id_key = self.pkey.name();
        let id_field = self.fields.get(id_key).ok_or_else(|| {
            Error::Config(format!(
                "generator {:?} has no primary-key field {id_key:?}",
                self.name
            ))
        })?;
        let id = id_field.generate_value(ctx, None, emitter, &child_scope)?;
        entity
            .borrow_mut()
            .insert(id_key.to_string(), id.clone());

        if let Some(parent_id) = parent_id {
            entity
                .borrow_mut()
                .insert("$parent".to_string(), parent_id.clone());
        }

        for (name, field) in &self.fields {
            if name == id_key || field.is_deferred() {
                continue;
            }
            let mut sub_emitter = emitter.next_emitter(&entity, name, field.multi_value());
            // generate_value may have populated the slot itself (entity
            // fields under a nested emitter)
            let value =
                field.generate_value(ctx, Some(&id), sub_emitter.as_mut(), &child_scope)?;
            let already_set = entity.borrow().contains_key(name);
            if !already_set {
                entity.borrow_mut().insert(name.clone(), value);
            }
        }

        for (name, field) in &self.fields {
            if !field.is_deferred() {
                continue;
            }
            let mut sub_emitter = emitter.next_emitter(&entity, name, field.multi_value());
            let value =
                field.generate_value(ctx, Some(&id), sub_emitter.as_mut(), &child_scope)?;
            entity.borrow_mut().insert(name.clone(), value);
        }

        emitter.emit(&entity, &self.declared_type)?;
        Ok(entity)
    }
}

fn new_typed_field(
    name: &str,
    kind_tag: &str,
    args: FieldArgs,
    count: Option<CountRange>,
    unique: bool,
) -> Result<Field> {
    match kind_tag {
        "string" => match args {
            FieldArgs::Length(length) if length >= 1 => {
                Ok(Field::new(FieldKind::String { length }, count, unique))
            }
            other => Err(args_mismatch(name, kind_tag, "a positive length", &other)),
        },
        "integer" => match args {
            FieldArgs::IntRange(min, max) => {
                if max < min {
                    return Err(Error::Config(format!(
                        "max {max} cannot be less than min {min}"
                    )));
                }
                Ok(Field::new(FieldKind::Integer { min, max }, count, unique))
            }
            other => Err(args_mismatch(name, kind_tag, "(min, max) integers", &other)),
        },
        "decimal" => match args {
            FieldArgs::FloatRange(min, max) => {
                if max < min {
                    return Err(Error::Config(format!(
                        "max {max} cannot be less than min {min}"
                    )));
                }
                Ok(Field::new(FieldKind::Float { min, max }, count, unique))
            }
            other => Err(args_mismatch(name, kind_tag, "(min, max) decimals", &other)),
        },
        "date" => match args {
            FieldArgs::DateRange(min, max, format) => {
                if max <= min {
                    return Err(Error::Config(format!(
                        "max {max} cannot be before min {min}"
                    )));
                }
                Ok(Field::new(
                    FieldKind::Date { min, max, format },
                    count,
                    unique,
                ))
            }
            other => Err(args_mismatch(
                name,
                kind_tag,
                "(min, max, format) dates",
                &other,
            )),
        },
        "uid" => Ok(Field::new(FieldKind::Uid, None, false)),
        "bool" => {
            if unique {
                return Err(Error::Config(
                    "boolean fields cannot be unique".to_string(),
                ));
            }
            Ok(Field::new(FieldKind::Bool, count, false))
        }
        "dict" => match args {
            FieldArgs::Category(category) => {
                Ok(Field::new(FieldKind::Dict { category }, count, unique))
            }
            other => Err(args_mismatch(name, kind_tag, "a category name", &other)),
        },
        "enum" => match args {
            FieldArgs::Values(values) => {
                Ok(Field::new(FieldKind::Enum { values }, count, unique))
            }
            other => Err(args_mismatch(name, kind_tag, "a value collection", &other)),
        },
        "serial" => {
            if count.is_some() {
                return Err(Error::Config(
                    "serial fields can only have a single value".to_string(),
                ));
            }
            Ok(Field::new(
                FieldKind::Serial {
                    counter: Rc::new(std::cell::Cell::new(0)),
                },
                None,
                false,
            ))
        }
        other => Err(Error::Config(format!("invalid field type {other:?}"))),
    }
}

fn args_mismatch(name: &str, kind_tag: &str, expected: &str, got: &FieldArgs) -> Error {
    Error::Config(format!(
        "expected field args to be {expected} for field {name} ({kind_tag}), but got {got:?}"
    ))
}

fn invalid_domain(domain: &str, dist: &Distribution) -> Error {
    Error::Config(format!(
        "invalid distribution domain: {domain:?} is not a valid domain for {} distributions",
        dist.kind_name()
    ))
}
