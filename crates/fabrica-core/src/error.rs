use thiserror::Error;

/// Core error type shared across Fabrica crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid entity or field configuration, raised at build time.
    #[error("configuration error: {0}")]
    Config(String),
    /// A symbol, parent entity, or generator key could not be resolved.
    #[error("resolution error: {0}")]
    Resolution(String),
    /// Incompatible operand types in a deferred expression.
    #[error("type error: {0}")]
    Type(String),
    /// Underlying IO failure (external dictionary data, output sinks).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results returned by Fabrica crates.
pub type Result<T> = std::result::Result<T, Error>;
