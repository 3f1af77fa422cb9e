//! Query executor subsystem
//!
//! Plan trees become trees of pull-based operators. A document is computed
//! only when the consumer asks for one, and flows up from a scan through
//! filter, sort, projection, distinct and limit operators.
//!
//! # Invariants
//!
//! - Scan order follows store key order; filter and projection keep it
//! - Sort is stable; set operators keep first-seen order
//! - `close` is idempotent and releases every cursor of the tree
//! - The first error halts the pipeline; cleanup still runs

mod builder;
mod errors;
#[allow(clippy::module_inception)]
mod executor;
mod filters;
mod hash_set;
mod limit;
mod operator;
mod projection;
mod result;
mod scan;
mod set_ops;
mod sorter;

pub use builder::OperatorBuilder;
pub use errors::{ExecutorError, ExecutorResult};
pub use executor::QueryExecutor;
pub use filters::{evaluate, matches, FilterOperator};
pub use hash_set::{
    document_digest, DistinctOperator, DocumentHasher, HashSetFilter, HasherKind,
    Sha256DocumentHasher, SipDocumentHasher,
};
pub use limit::LimitOperator;
pub use operator::{BoxedOperator, Operator, ValuesOperator};
pub use projection::ProjectionOperator;
pub use result::{ExecutionResult, Rows};
pub use scan::{ScanOperator, ScanSource};
pub use set_ops::SetOpOperator;
pub use sorter::{sort_documents, SortOperator};
