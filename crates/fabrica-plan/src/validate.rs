use std::collections::BTreeSet;

use crate::errors::PlanError;
use crate::model::{
    CountDecl, Document, EntityDecl, EntityRef, FieldDecl, FieldKindDecl, GenerateDecl,
};
use crate::PLAN_VERSION;

const DISTRIBUTIONS: &[&str] = &["normal", "uniform", "weighted", "percent"];

/// Structural validation of a plan document.
///
/// Catches what the serde model cannot: duplicate names, inverted count
/// ranges, distribution arity mismatches. Semantic checks that need the
/// generator graph (unknown parents, argument bounds) stay with the
/// engine.
pub fn validate_document(document: &Document) -> Result<(), PlanError> {
    if document.plan_version != PLAN_VERSION {
        return Err(PlanError::Invalid(format!(
            "unsupported plan_version {:?} (expected {:?})",
            document.plan_version, PLAN_VERSION
        )));
    }

    let mut names = BTreeSet::new();
    for entity in &document.entities {
        if let Some(name) = &entity.name {
            if !names.insert(name.clone()) {
                return Err(PlanError::Invalid(format!(
                    "duplicate entity name {name:?}"
                )));
            }
        }
        validate_entity(entity)?;
    }

    for statement in &document.generate {
        validate_generate(statement)?;
    }

    Ok(())
}

fn validate_entity(entity: &EntityDecl) -> Result<(), PlanError> {
    let label = entity.name.as_deref().unwrap_or("<anonymous>");
    let mut fields = BTreeSet::new();
    for field in &entity.fields {
        if !fields.insert(field.name.clone()) {
            return Err(PlanError::Invalid(format!(
                "duplicate field {:?} in entity {label:?}",
                field.name
            )));
        }
        validate_field(field, label)?;
    }
    Ok(())
}

fn validate_field(field: &FieldDecl, entity: &str) -> Result<(), PlanError> {
    if let Some(CountDecl::Range { min, max }) = &field.count {
        if max < min {
            return Err(PlanError::Invalid(format!(
                "count range for field {:?} in entity {entity:?} has max < min",
                field.name
            )));
        }
    }

    match &field.kind {
        FieldKindDecl::Enum { values } if values.is_empty() => Err(PlanError::Invalid(format!(
            "enum field {:?} in entity {entity:?} has no values",
            field.name
        ))),
        FieldKindDecl::Distribution {
            dist,
            weights,
            values,
            domain,
        } => {
            if !DISTRIBUTIONS.contains(&dist.as_str()) {
                return Err(PlanError::Invalid(format!(
                    "unknown distribution {dist:?} for field {:?}",
                    field.name
                )));
            }
            let bins = match (values, domain) {
                (Some(values), None) => values.len(),
                (None, Some(domain)) => domain.bins.len(),
                _ => {
                    return Err(PlanError::Invalid(format!(
                        "distribution field {:?} needs exactly one of `values` or `domain`",
                        field.name
                    )))
                }
            };
            if bins == 0 {
                return Err(PlanError::Invalid(format!(
                    "distribution field {:?} has no bins",
                    field.name
                )));
            }
            if !weights.is_empty() && weights.len() != bins {
                return Err(PlanError::Invalid(format!(
                    "distribution field {:?} has {} weights for {} bins",
                    field.name,
                    weights.len(),
                    bins
                )));
            }
            Ok(())
        }
        FieldKindDecl::Entity {
            entity: EntityRef::Decl(inner),
        } => validate_entity(inner),
        _ => Ok(()),
    }
}

fn validate_generate(statement: &GenerateDecl) -> Result<(), PlanError> {
    if statement.count < 1 {
        return Err(PlanError::Invalid(
            "generate requires a count of at least 1".to_string(),
        ));
    }
    if let EntityRef::Decl(inner) = &statement.entity {
        validate_entity(inner)?;
    }
    Ok(())
}
