//! Document store error types

use thiserror::Error;

use crate::codec::CodecError;
use crate::engine::EngineError;
use crate::errors::ErrorKind;

/// Result type for document store operations
pub type TableResult<T> = Result<T, TableError>;

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("index not found: {index} on table {table}")]
    IndexNotFound { table: String, index: String },

    #[error("index already exists: {index} on table {table}")]
    IndexExists { table: String, index: String },

    #[error("document not found in table {table}: key {key}")]
    DocumentNotFound { table: String, key: String },

    #[error("document is missing primary key field '{field}' of table {table}")]
    MissingPrimaryKey { table: String, field: String },

    #[error("duplicate primary key {key} in table {table}")]
    DuplicatePrimaryKey { table: String, key: String },

    #[error("primary key of a stored document cannot change in table {table}")]
    PrimaryKeyChanged { table: String },

    #[error("corrupted record in table {table}: {reason}")]
    Corruption { table: String, reason: String },

    #[error("invalid catalog entry: {0}")]
    Catalog(#[from] serde_json::Error),
}

impl TableError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            TableError::Engine(e) => e.code(),
            TableError::Codec(e) => e.code(),
            TableError::TableNotFound(_) => "TESSERA_TABLE_NOT_FOUND",
            TableError::TableExists(_) => "TESSERA_TABLE_EXISTS",
            TableError::IndexNotFound { .. } => "TESSERA_INDEX_NOT_FOUND",
            TableError::IndexExists { .. } => "TESSERA_INDEX_EXISTS",
            TableError::DocumentNotFound { .. } => "TESSERA_DOCUMENT_NOT_FOUND",
            TableError::MissingPrimaryKey { .. } => "TESSERA_MISSING_PRIMARY_KEY",
            TableError::DuplicatePrimaryKey { .. } => "TESSERA_DUPLICATE_PRIMARY_KEY",
            TableError::PrimaryKeyChanged { .. } => "TESSERA_PRIMARY_KEY_CHANGED",
            TableError::Corruption { .. } => "TESSERA_DATA_CORRUPTION",
            TableError::Catalog(_) => "TESSERA_CATALOG_CORRUPTION",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::Engine(e) => ErrorKind::from(e),
            TableError::Codec(_) => ErrorKind::Encoding,
            TableError::TableNotFound(_)
            | TableError::IndexNotFound { .. }
            | TableError::DocumentNotFound { .. } => ErrorKind::NotFound,
            TableError::TableExists(_)
            | TableError::IndexExists { .. }
            | TableError::MissingPrimaryKey { .. }
            | TableError::DuplicatePrimaryKey { .. }
            | TableError::PrimaryKeyChanged { .. } => ErrorKind::Constraint,
            TableError::Corruption { .. } | TableError::Catalog(_) => ErrorKind::Storage,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
