//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` on `complete`
//! - Logs `{name}_FAILED` on `fail`
//! - Logs `{name}_INCOMPLETE` when dropped without either

use std::cell::Cell;
use std::time::Instant;

use tracing::{error, info, warn, Span};

use super::{field_span, record_fields};

/// A scope that logs begin and outcome events
///
/// Fields live on a span, so every event of the scope carries them as
/// separate tracing fields.
///
/// # Usage
///
/// ```ignore
/// let scope = ObservationScope::new("QUERY");
/// // ... do work ...
/// scope.complete(); // logs QUERY_COMPLETE
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: Cell<bool>,
    span: Span,
    start: Instant,
}

impl<'a> ObservationScope<'a> {
    /// Create a new observation scope
    ///
    /// Logs `{name}_BEGIN` immediately.
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Create a new observation scope with fields repeated on every event
    pub fn with_fields(name: &'a str, fields: &[(&str, &str)]) -> Self {
        let span = field_span(fields);
        span.in_scope(|| info!(event = %format!("{}_BEGIN", name)));

        Self {
            name,
            completed: Cell::new(false),
            span,
            start: Instant::now(),
        }
    }

    /// Mark the scope as successfully completed
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as successfully completed with additional fields
    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.completed.set(true);
        record_fields(&self.span, extra_fields);
        let elapsed_us = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.span.in_scope(|| {
            info!(
                event = %format!("{}_COMPLETE", self.name),
                elapsed_us
            )
        });
    }

    /// Mark the scope as failed with a reason
    pub fn fail(self, reason: &str) {
        self.completed.set(true);
        self.span.record("reason", reason);
        self.span
            .in_scope(|| error!(event = %format!("{}_FAILED", self.name)));
    }

    /// Check if the scope has been completed
    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            self.span.in_scope(|| {
                warn!(
                    event = %format!("{}_INCOMPLETE", self.name),
                    reason = "scope dropped without completion"
                )
            });
        }
    }
}
