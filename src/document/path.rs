//! Dotted field paths (`address.city`, `tags.0`)

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{DocumentError, DocumentResult};

/// A path into a document. Numeric segments index into arrays.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parses a dotted path. Empty segments are rejected.
    pub fn parse(path: &str) -> DocumentResult<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(DocumentError::InvalidPath(path.to_string()));
        }
        Ok(Self(segments))
    }

    /// A single top-level field, taken verbatim (dots included)
    pub fn field(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns the field name when the path has exactly one segment
    pub fn as_field(&self) -> Option<&str> {
        match self.0.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// The last segment, used to name projected fields
    pub fn last(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
