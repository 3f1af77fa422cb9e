//! Executor error types
//!
//! The first error an operator hits halts the pipeline. Nothing here is
//! retried; the executor closes the operator tree and returns the error.

use thiserror::Error;

use crate::codec::CodecError;
use crate::engine::EngineError;
use crate::errors::ErrorKind;
use crate::table::TableError;

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A parameter reached evaluation without being bound
    #[error("parameter ?{position} has no value")]
    UnboundParameter { position: usize },

    #[error("execution failed: {0}")]
    Failed(String),
}

impl ExecutorError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorError::Table(e) => e.code(),
            ExecutorError::Engine(e) => e.code(),
            ExecutorError::Codec(e) => e.code(),
            ExecutorError::UnboundParameter { .. } => "TESSERA_EXECUTION_UNBOUND_PARAMETER",
            ExecutorError::Failed(_) => "TESSERA_EXECUTION_FAILED",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutorError::Table(e) => e.kind(),
            ExecutorError::Engine(e) => ErrorKind::from(e),
            ExecutorError::Codec(_) => ErrorKind::Encoding,
            ExecutorError::UnboundParameter { .. } | ExecutorError::Failed(_) => {
                ErrorKind::Execution
            }
        }
    }

    /// Returns true when the failure is a checksum or index mismatch
    pub fn is_corruption(&self) -> bool {
        matches!(self, ExecutorError::Table(TableError::Corruption { .. }))
    }
}
