//! tessera - an embeddable document database query core
//!
//! Layers, bottom up:
//!
//! - `document`: dynamically typed values and ordered documents
//! - `codec`: order-preserving binary encoding of values
//! - `engine`: transactional ordered key/value stores, plus an in-memory backend
//! - `table`: tables, secondary indexes and the catalog on top of an engine
//! - `planner`: logical queries to immutable plan trees, with explain output
//! - `executor`: pull-based operators running a plan inside a transaction
//! - `database`: the handle tying configuration, engine and transactions together
//!
//! ```ignore
//! use tessera::{Database, DatabaseConfig, Document, Expr, FieldPath, Query, TableOptions};
//!
//! let db = Database::open(DatabaseConfig::default());
//! db.update(|tx| {
//!     tx.create_table("user", TableOptions::with_primary_key(FieldPath::field("ID")))?;
//!     tx.insert("user", &Document::new().with("ID", 1).with("Name", "bar"))?;
//!     Ok(())
//! })?;
//!
//! let rows = db.view(|tx| {
//!     let query = Query::new("user").with_predicate(Expr::eq(Expr::field("Name"), Expr::lit("bar")));
//!     Ok(tx.execute(&query.into(), &[])?.documents)
//! })?;
//! ```

pub mod codec;
pub mod config;
pub mod database;
pub mod document;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod table;

pub use config::{ConfigError, DatabaseConfig, EngineKind};
pub use database::{Database, Tx};
pub use document::{Document, FieldPath, Value, ValueType};
pub use engine::{Engine, MemoryEngine};
pub use errors::{Error, ErrorKind, Result};
pub use executor::{ExecutionResult, HasherKind, Rows};
pub use planner::{
    CmpOp, ExplainPlan, Expr, ProjectionItem, Query, SetOperator, SortSpec, Statement,
};
pub use table::TableOptions;
