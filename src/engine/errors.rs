//! Storage engine error types

use thiserror::Error;

/// Result type for storage engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("key not found")]
    KeyNotFound,

    #[error("store not found: {0}")]
    StoreNotFound(String),

    #[error("store already exists: {0}")]
    StoreExists(String),

    #[error("transaction is read-only")]
    ReadOnly,

    #[error("another write transaction is active")]
    WriterBusy,

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl EngineError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::KeyNotFound => "TESSERA_STORAGE_KEY_NOT_FOUND",
            EngineError::StoreNotFound(_) => "TESSERA_STORAGE_STORE_NOT_FOUND",
            EngineError::StoreExists(_) => "TESSERA_STORAGE_STORE_EXISTS",
            EngineError::ReadOnly => "TESSERA_STORAGE_READ_ONLY",
            EngineError::WriterBusy => "TESSERA_STORAGE_WRITER_BUSY",
            EngineError::Backend(_) => "TESSERA_STORAGE_BACKEND",
        }
    }

    /// Returns true for the expected, recoverable "absent" outcomes
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::KeyNotFound | EngineError::StoreNotFound(_))
    }
}
