use thiserror::Error;

/// Errors raised while loading or validating a plan document.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid plan: {0}")]
    Invalid(String),
    #[error("plan parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
