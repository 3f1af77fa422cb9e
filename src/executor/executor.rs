//! Query executor
//!
//! Drives the root operator of a plan. Execution flow:
//! 1. Build the operator tree for the plan (no I/O yet)
//! 2. Pull documents until the end of the stream or the caller's row cap
//! 3. Stop at the first error and propagate it
//! 4. Close the operator tree on every exit path
//!
//! All work happens inside the caller's transaction.

use tracing::debug;

use crate::engine::Transaction;
use crate::planner::QueryPlan;

use super::builder::OperatorBuilder;
use super::errors::ExecutorResult;
use super::hash_set::HasherKind;
use super::operator::BoxedOperator;
use super::result::{ExecutionResult, Rows};

/// Query executor bound to one transaction
pub struct QueryExecutor<'a> {
    tx: &'a dyn Transaction,
    hasher: HasherKind,
}

/// Closes the operator tree when execution leaves scope
struct CloseGuard<'a>(BoxedOperator<'a>);

impl Drop for CloseGuard<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

impl<'a> QueryExecutor<'a> {
    pub fn new(tx: &'a dyn Transaction) -> Self {
        Self {
            tx,
            hasher: HasherKind::default(),
        }
    }

    /// Selects the hasher used by DISTINCT and set operators
    pub fn with_hasher(mut self, hasher: HasherKind) -> Self {
        self.hasher = hasher;
        self
    }

    /// Opens a lazy result stream over the plan
    pub fn open(&self, plan: &QueryPlan) -> ExecutorResult<Rows<'a>> {
        let root = OperatorBuilder::new(self.tx, self.hasher).build(&plan.root)?;
        Ok(Rows::new(root))
    }

    /// Executes a plan and collects its results.
    ///
    /// With `max_rows`, execution stops as soon as that many documents were
    /// produced. Same plan and same data give the same results.
    pub fn execute(&self, plan: &QueryPlan, max_rows: Option<usize>) -> ExecutorResult<ExecutionResult> {
        let builder = OperatorBuilder::new(self.tx, self.hasher);
        let scanned = builder.scanned();
        let mut root = CloseGuard(builder.build(&plan.root)?);

        let mut documents = Vec::new();
        let mut stopped_early = false;
        loop {
            if max_rows == Some(documents.len()) {
                stopped_early = true;
                break;
            }
            match root.0.next()? {
                Some(doc) => documents.push(doc),
                None => break,
            }
        }
        drop(root);

        debug!(
            returned = documents.len(),
            scanned = scanned.get(),
            stopped_early,
            "query executed"
        );

        Ok(ExecutionResult {
            returned_count: documents.len(),
            scanned_count: scanned.get(),
            stopped_early,
            documents,
        })
    }
}
