//! Document and value error types

use thiserror::Error;

use super::value::ValueType;

/// Result type for value model operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors raised by the value model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("cannot cast {from} to {to}")]
    InvalidCast { from: ValueType, to: ValueType },

    #[error("invalid field path '{0}'")]
    InvalidPath(String),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
}

impl DocumentError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::InvalidCast { .. } => "TESSERA_VALUE_INVALID_CAST",
            DocumentError::InvalidPath(_) => "TESSERA_VALUE_INVALID_PATH",
            DocumentError::NotAnObject(_) => "TESSERA_VALUE_NOT_AN_OBJECT",
        }
    }
}
