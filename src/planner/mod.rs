//! Query planner subsystem
//!
//! Turns a logical `Statement` plus catalog metadata into an immutable
//! tree of plan nodes. Planning performs no I/O and is deterministic:
//! the same statement against the same catalog yields the same plan.
//!
//! # Scan Selection Priority (strict order)
//!
//! 1. Primary key equality
//! 2. Indexed equality
//! 3. Primary key range
//! 4. Indexed range
//! 5. Index matching the single ordering key
//! 6. Full table scan
//!
//! Ties broken lexicographically by field path, then index name.

mod ast;
mod bounds;
mod errors;
mod explain;
#[allow(clippy::module_inception)]
mod planner;

pub use ast::{
    CmpOp, CompoundQuery, Expr, ProjectionItem, Query, SetOperator, SortDirection, SortSpec,
    Statement,
};
pub use bounds::ScanRange;
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::ExplainPlan;
pub use planner::{CatalogView, PlanNode, ProjectedField, QueryPlan, QueryPlanner, ScanType};
