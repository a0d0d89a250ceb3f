//! Errors raised by the rules crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    /// The document did not match the canonical typed shape.
    #[error("document does not match the canonical shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("unknown attribute axis: {0}")]
    UnknownAxis(String),
}

pub type Result<T> = std::result::Result<T, RulesError>;
