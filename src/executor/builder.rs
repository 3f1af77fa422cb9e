//! Builds operator trees from plan trees

use std::cell::Cell;
use std::rc::Rc;

use crate::engine::Transaction;
use crate::planner::PlanNode;

use super::errors::ExecutorResult;
use super::filters::FilterOperator;
use super::hash_set::{DistinctOperator, HasherKind};
use super::limit::LimitOperator;
use super::operator::BoxedOperator;
use super::projection::ProjectionOperator;
use super::scan::{ScanOperator, ScanSource};
use super::set_ops::SetOpOperator;
use super::sorter::SortOperator;

/// Turns plan nodes into operators bound to one transaction
pub struct OperatorBuilder<'a> {
    tx: &'a dyn Transaction,
    hasher: HasherKind,
    scanned: Rc<Cell<usize>>,
}

impl<'a> OperatorBuilder<'a> {
    pub fn new(tx: &'a dyn Transaction, hasher: HasherKind) -> Self {
        Self {
            tx,
            hasher,
            scanned: Rc::new(Cell::new(0)),
        }
    }

    /// Counter of documents read by every scan this builder creates
    pub fn scanned(&self) -> Rc<Cell<usize>> {
        self.scanned.clone()
    }

    pub fn build(&self, node: &PlanNode) -> ExecutorResult<BoxedOperator<'a>> {
        let op: BoxedOperator<'a> = match node {
            PlanNode::TableScan {
                table,
                range,
                reverse,
                ..
            } => Box::new(
                ScanOperator::new(self.tx, table.clone(), ScanSource::Table, range.key_range()?, *reverse)
                    .with_counter(self.scanned.clone()),
            ),
            PlanNode::IndexScan {
                table,
                index,
                range,
                reverse,
                ..
            } => Box::new(
                ScanOperator::new(
                    self.tx,
                    table.clone(),
                    ScanSource::Index(index.name.clone()),
                    range.key_range()?,
                    *reverse,
                )
                .with_counter(self.scanned.clone()),
            ),
            PlanNode::Filter { input, predicate } => {
                Box::new(FilterOperator::new(self.build(input)?, predicate.clone()))
            }
            PlanNode::Sort { input, keys } => {
                Box::new(SortOperator::new(self.build(input)?, keys.clone()))
            }
            PlanNode::Projection { input, fields } => {
                Box::new(ProjectionOperator::new(self.build(input)?, fields.clone()))
            }
            PlanNode::Distinct { input } => {
                Box::new(DistinctOperator::new(self.build(input)?, self.hasher.build()))
            }
            PlanNode::Limit {
                input,
                limit,
                offset,
            } => Box::new(LimitOperator::new(self.build(input)?, *limit, *offset)),
            PlanNode::SetOp { op, left, right } => {
                let kind = self.hasher;
                Box::new(SetOpOperator::new(
                    *op,
                    self.build(left)?,
                    self.build(right)?,
                    move || kind.build(),
                ))
            }
        };
        Ok(op)
    }
}
