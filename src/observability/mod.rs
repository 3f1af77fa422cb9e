//! Observability subsystem
//!
//! Structured events over `tracing`. The library never installs a
//! subscriber; the embedding application decides where events go.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No background threads
//!
//! # Usage
//!
//! ```ignore
//! use tessera::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::TableCreated, &[("table", "user")]);
//!
//! let scope = ObservationScope::new("QUERY");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod scope;

pub use events::Event;
pub use scope::ObservationScope;

use tracing::field::Empty;
use tracing::{error, info, info_span, Span};

/// Field names a lifecycle event may carry
pub const FIELD_NAMES: &[&str] = &[
    "table", "index", "engine", "writable", "path", "code", "reason", "error", "accepted",
    "returned", "scanned",
];

/// Span holding `fields` as individual tracing fields. Names outside
/// `FIELD_NAMES` are collected in `other` as `key=value` pairs.
pub(crate) fn field_span(fields: &[(&str, &str)]) -> Span {
    let span = info_span!(
        "tessera",
        table = Empty,
        index = Empty,
        engine = Empty,
        writable = Empty,
        path = Empty,
        code = Empty,
        reason = Empty,
        error = Empty,
        accepted = Empty,
        returned = Empty,
        scanned = Empty,
        other = Empty
    );
    record_fields(&span, fields);
    span
}

pub(crate) fn record_fields(span: &Span, fields: &[(&str, &str)]) {
    let mut other = Vec::new();
    for (key, value) in fields {
        if FIELD_NAMES.contains(key) {
            span.record(*key, *value);
        } else {
            other.push(format!("{}={}", key, value));
        }
    }
    if !other.is_empty() {
        span.record("other", other.join(" ").as_str());
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let span = field_span(fields);
    let _entered = span.enter();
    if event.is_fatal() {
        error!(event = event.as_str());
    } else {
        info!(event = event.as_str());
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Captured;
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::DatabaseOpened);
        log_event(Event::DataCorruption);
    }

    #[test]
    fn test_fields_recorded_individually() {
        let captured = Captured::default();
        captured.run(|| {
            log_event_with_fields(Event::IndexCreated, &[("table", "user"), ("index", "idx_age")])
        });

        assert_eq!(captured.values("event"), vec!["INDEX_CREATED"]);
        assert_eq!(captured.values("table"), vec!["user"]);
        assert_eq!(captured.values("index"), vec!["idx_age"]);
        assert!(captured.values("other").is_empty());
    }

    #[test]
    fn test_unknown_field_names_kept() {
        let captured = Captured::default();
        captured.run(|| log_event_with_fields(Event::TableCreated, &[("shard", "3")]));
        assert_eq!(captured.values("other"), vec!["shard=3"]);
    }
}
