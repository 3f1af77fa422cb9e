//! Value model for tessera
//!
//! Documents are schema-less records: a mapping from unique field names to
//! tagged values. The value model defines equality, the cross-type total
//! order used for sorting, and the coercion rules between tags.

mod document;
mod errors;
mod json;
mod path;
mod value;

pub use document::Document;
pub use errors::{DocumentError, DocumentResult};
pub use path::FieldPath;
pub use value::{Value, ValueType};
