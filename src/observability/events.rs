//! Observable events
//!
//! Events are explicit and typed. Every structured log line the database
//! emits carries one of these names in its `event` field.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Database opened over an engine
    DatabaseOpened,

    // Transactions
    TxBegin,
    TxCommit,
    TxRollback,

    // Catalog
    TableCreated,
    TableDropped,
    IndexCreated,
    IndexDropped,

    // Query
    /// Query received
    QueryReceived,
    /// Query planned
    QueryPlanned,
    /// Query executed successfully
    QueryExecuted,
    /// Query rejected by the planner
    QueryRejected,
    /// Query failed during execution
    QueryFailed,

    // Explain
    ExplainBegin,
    ExplainComplete,

    /// Checksum mismatch or dangling index entry
    DataCorruption,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatabaseOpened => "DATABASE_OPENED",

            Event::TxBegin => "TX_BEGIN",
            Event::TxCommit => "TX_COMMIT",
            Event::TxRollback => "TX_ROLLBACK",

            Event::TableCreated => "TABLE_CREATED",
            Event::TableDropped => "TABLE_DROPPED",
            Event::IndexCreated => "INDEX_CREATED",
            Event::IndexDropped => "INDEX_DROPPED",

            Event::QueryReceived => "QUERY_BEGIN",
            Event::QueryPlanned => "QUERY_PLANNED",
            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::QueryFailed => "QUERY_FAILED",

            Event::ExplainBegin => "EXPLAIN_BEGIN",
            Event::ExplainComplete => "EXPLAIN_COMPLETE",

            Event::DataCorruption => "DATA_CORRUPTION",
        }
    }

    /// Returns true if this event reports damaged data
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::DataCorruption)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::DatabaseOpened,
            Event::TxBegin,
            Event::TxCommit,
            Event::TxRollback,
            Event::TableCreated,
            Event::TableDropped,
            Event::IndexCreated,
            Event::IndexDropped,
            Event::QueryReceived,
            Event::QueryPlanned,
            Event::QueryExecuted,
            Event::QueryRejected,
            Event::QueryFailed,
            Event::ExplainBegin,
            Event::ExplainComplete,
            Event::DataCorruption,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            // Verify all uppercase format
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::DataCorruption.is_fatal());
        assert!(!Event::QueryExecuted.is_fatal());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::QueryReceived), "QUERY_BEGIN");
        assert_eq!(format!("{}", Event::TxCommit), "TX_COMMIT");
    }
}
