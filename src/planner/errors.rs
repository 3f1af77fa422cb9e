//! Planner error types
//!
//! Error codes:
//! - TESSERA_QUERY_INVALID (REJECT)
//! - TESSERA_QUERY_UNKNOWN_TABLE (REJECT)
//! - TESSERA_QUERY_UNKNOWN_INDEX (REJECT)
//! - TESSERA_QUERY_UNBOUND_PARAMETER (REJECT)
//!
//! Every planner error is raised before any operator is opened.

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected, nothing executed
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Malformed query structure
    QueryInvalid,
    /// Source table does not exist
    UnknownTable,
    /// Index hint names a missing index
    UnknownIndex,
    /// Positional parameter without a value
    UnboundParameter,
}

impl PlannerErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::QueryInvalid => "TESSERA_QUERY_INVALID",
            PlannerErrorCode::UnknownTable => "TESSERA_QUERY_UNKNOWN_TABLE",
            PlannerErrorCode::UnknownIndex => "TESSERA_QUERY_UNKNOWN_INDEX",
            PlannerErrorCode::UnboundParameter => "TESSERA_QUERY_UNBOUND_PARAMETER",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    /// Table, index or field the error refers to
    subject: Option<String>,
}

impl PlannerError {
    pub fn query_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::QueryInvalid,
            message: reason.into(),
            subject: None,
        }
    }

    pub fn unknown_table(table: impl Into<String>) -> Self {
        let t = table.into();
        Self {
            code: PlannerErrorCode::UnknownTable,
            message: format!("Table '{}' does not exist", t),
            subject: Some(t),
        }
    }

    pub fn unknown_index(table: &str, index: impl Into<String>) -> Self {
        let i = index.into();
        Self {
            code: PlannerErrorCode::UnknownIndex,
            message: format!("Index '{}' does not exist on table '{}'", i, table),
            subject: Some(i),
        }
    }

    pub fn unbound_parameter(position: usize) -> Self {
        Self {
            code: PlannerErrorCode::UnboundParameter,
            message: format!("No value bound for parameter ?{}", position),
            subject: None,
        }
    }

    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
