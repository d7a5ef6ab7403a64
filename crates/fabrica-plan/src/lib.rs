//! Plan document model for Fabrica.
//!
//! A plan is a JSON document declaring entities (typed fields, optional
//! inheritance and primary-key policy) and `generate` statements. This
//! crate defines the serde model, structural validation, and the JSON
//! Schema of the format. Turning a document into runnable generators is
//! the engine's job (`fabrica-generate`).

pub mod errors;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::PlanError;
pub use model::{
    CountDecl, DistDomainDecl, Document, EntityDecl, EntityRef, ExprDecl, FieldDecl,
    FieldKindDecl, GenerateDecl, PkeyDecl, PkeyKindDecl,
};
pub use schema::document_json_schema;
pub use validate::validate_document;

/// Current contract version for plan documents.
pub const PLAN_VERSION: &str = "0.1";

/// Parse and validate a plan document from JSON text.
pub fn parse_document(text: &str) -> Result<Document, PlanError> {
    let document: Document = serde_json::from_str(text)?;
    validate_document(&document)?;
    Ok(document)
}
