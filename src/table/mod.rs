//! Document store
//!
//! Maps tables of documents onto engine stores. Every operation runs
//! against a caller-supplied transaction; nothing here begins, commits or
//! rolls back on its own.

mod catalog;
mod errors;
mod range;
mod record;
#[allow(clippy::module_inception)]
mod table;

pub use catalog::{Catalog, CatalogSnapshot, IndexInfo, TableInfo, TableOptions, CATALOG_STORE};
pub use errors::{TableError, TableResult};
pub use range::KeyRange;
pub use record::{compute_checksum, decode_record, encode_record, RecordError};
pub use table::{IndexIter, Table, TableIter};
