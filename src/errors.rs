//! Crate-level error taxonomy
//!
//! Every subsystem error maps onto one [`ErrorKind`]:
//!
//! - `Encoding`: malformed or unsupported value (model invariant violation)
//! - `NotFound`: key, table, index or document absent
//! - `Permission`: mutation through a read-only transaction
//! - `Storage`: backend failure or corrupted data
//! - `Planning`: query rejected before execution
//! - `Constraint`: duplicate or missing key, table or index
//! - `Execution`: expression evaluation failure

use std::fmt;

use thiserror::Error;

use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::document::DocumentError;
use crate::engine::EngineError;
use crate::executor::ExecutorError;
use crate::planner::PlannerError;
use crate::table::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Encoding,
    NotFound,
    Permission,
    Storage,
    Planning,
    Constraint,
    Execution,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Encoding => "ENCODING",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Permission => "PERMISSION",
            ErrorKind::Storage => "STORAGE",
            ErrorKind::Planning => "PLANNING",
            ErrorKind::Constraint => "CONSTRAINT",
            ErrorKind::Execution => "EXECUTION",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&EngineError> for ErrorKind {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::KeyNotFound | EngineError::StoreNotFound(_) => ErrorKind::NotFound,
            EngineError::ReadOnly => ErrorKind::Permission,
            EngineError::StoreExists(_) => ErrorKind::Constraint,
            EngineError::WriterBusy | EngineError::Backend(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for the public API
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Codec(_) | Error::Document(_) => ErrorKind::Encoding,
            Error::Engine(e) => ErrorKind::from(e),
            Error::Table(e) => e.kind(),
            Error::Planner(_) => ErrorKind::Planning,
            Error::Executor(e) => e.kind(),
            Error::Config(_) => ErrorKind::Storage,
        }
    }

    /// Stable error code of the underlying failure
    pub fn code(&self) -> &'static str {
        match self {
            Error::Codec(e) => e.code(),
            Error::Document(e) => e.code(),
            Error::Engine(e) => e.code(),
            Error::Table(e) => e.code(),
            Error::Planner(e) => e.code().code(),
            Error::Executor(e) => e.code(),
            Error::Config(e) => e.code(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kinds() {
        assert_eq!(ErrorKind::from(&EngineError::KeyNotFound), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from(&EngineError::ReadOnly), ErrorKind::Permission);
        assert_eq!(
            ErrorKind::from(&EngineError::Backend("disk".into())),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_wrapped_kinds() {
        let err = Error::from(PlannerError::unknown_table("user"));
        assert_eq!(err.kind(), ErrorKind::Planning);
        assert_eq!(err.code(), "TESSERA_QUERY_UNKNOWN_TABLE");

        let err = Error::from(TableError::TableNotFound("user".into()));
        assert!(err.is_not_found());

        let err = Error::from(ExecutorError::UnboundParameter { position: 1 });
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert_eq!(err.kind().to_string(), "EXECUTION");
    }
}
