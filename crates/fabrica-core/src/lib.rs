//! Core contracts shared across Fabrica crates.
//!
//! This crate defines the runtime value model, the chained symbol scopes
//! used by deferred expressions, the deferred expression algebra, and the
//! seedable random source the engine draws from.

pub mod error;
pub mod expr;
pub mod rng;
pub mod scope;
pub mod value;

pub use error::{Error, Result};
pub use expr::{apply_operator, resolve, Expr, Op};
pub use rng::GenRng;
pub use scope::Scope;
pub use value::{new_record, Record, SymbolTable, Value};
