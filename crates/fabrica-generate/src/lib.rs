//! Entity generation engine for Fabrica.
//!
//! A `Generator` is an entity template: an ordered set of typed field
//! producers, a primary-key policy, and optional inheritance from a
//! parent generator. `Generator::generate` produces records through an
//! `Emitter`, evaluating ordinary fields first and deferred fields in a
//! second phase so expressions can observe their siblings.

pub mod distribution;
pub mod emitter;
pub mod field;
pub mod field_kind;
pub mod generator;
pub mod interpreter;
pub mod model;
pub mod output;
pub mod pkey;
mod uid;

pub use distribution::Distribution;
pub use emitter::{Emitter, FlatEmitter, GenerationOutput, NestedEmitter, TestEmitter};
pub use field::{CountRange, Field, FieldArgs};
pub use field_kind::FieldKind;
pub use generator::{GenContext, Generator, GeneratorArena};
pub use interpreter::{Interpreter, NamespaceCounter};
pub use model::{GenerationReport, TypeReport};
pub use pkey::{PkeyKind, PrimaryKey};
