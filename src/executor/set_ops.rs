//! Set operators over two inputs
//!
//! - UNION streams the left input then the right, passing first sightings
//! - UNION ALL streams both inputs unchanged
//! - INTERSECT and EXCEPT first drain the right input into a hash set, then
//!   stream the left input, passing first sightings found (or not found)
//!   in that set
//!
//! Survivors keep first-seen order. Equality is digest equality, see
//! `hash_set`.

use crate::document::Document;
use crate::planner::SetOperator;

use super::errors::ExecutorResult;
use super::hash_set::{DocumentHasher, HashSetFilter};
use super::operator::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Left,
    Right,
    Done,
}

pub struct SetOpOperator<L, R, H: DocumentHasher = Box<dyn DocumentHasher>> {
    op: SetOperator,
    left: L,
    right: R,
    /// Digests already emitted
    emitted: HashSetFilter<H>,
    /// Digests of the right input, for INTERSECT and EXCEPT
    right_rows: Option<HashSetFilter<H>>,
    spare: Option<H>,
    phase: Phase,
    left_closed: bool,
    right_closed: bool,
}

impl<L: Operator, R: Operator, H: DocumentHasher> SetOpOperator<L, R, H> {
    /// `hasher` is called once per digest set the operator needs
    pub fn new(op: SetOperator, left: L, right: R, mut hasher: impl FnMut() -> H) -> Self {
        let spare = match op {
            SetOperator::Intersect | SetOperator::Except => Some(hasher()),
            SetOperator::Union | SetOperator::UnionAll => None,
        };
        Self {
            op,
            left,
            right,
            emitted: HashSetFilter::new(hasher()),
            right_rows: None,
            spare,
            phase: Phase::Left,
            left_closed: false,
            right_closed: false,
        }
    }

    /// Each input is closed at most once
    fn close_left(&mut self) {
        if !self.left_closed {
            self.left_closed = true;
            self.left.close();
        }
    }

    fn close_right(&mut self) {
        if !self.right_closed {
            self.right_closed = true;
            self.right.close();
        }
    }

    fn load_right(&mut self) -> ExecutorResult<()> {
        if self.right_rows.is_some() {
            return Ok(());
        }
        let hasher = match self.spare.take() {
            Some(hasher) => hasher,
            None => return Ok(()),
        };
        let mut rows = HashSetFilter::new(hasher);
        while let Some(doc) = self.right.next()? {
            rows.insert(&doc)?;
        }
        self.close_right();
        self.right_rows = Some(rows);
        Ok(())
    }

    fn next_union(&mut self) -> ExecutorResult<Option<Document>> {
        let dedup = self.op == SetOperator::Union;
        loop {
            let doc = match self.phase {
                Phase::Left => match self.left.next()? {
                    Some(doc) => doc,
                    None => {
                        self.close_left();
                        self.phase = Phase::Right;
                        continue;
                    }
                },
                Phase::Right => match self.right.next()? {
                    Some(doc) => doc,
                    None => {
                        self.close_right();
                        self.phase = Phase::Done;
                        return Ok(None);
                    }
                },
                Phase::Done => return Ok(None),
            };
            if !dedup || self.emitted.insert(&doc)? {
                return Ok(Some(doc));
            }
        }
    }

    fn next_filtered(&mut self) -> ExecutorResult<Option<Document>> {
        if self.phase == Phase::Done {
            return Ok(None);
        }
        self.load_right()?;
        let keep_found = self.op == SetOperator::Intersect;
        while let Some(doc) = self.left.next()? {
            let found = match &mut self.right_rows {
                Some(rows) => rows.contains(&doc)?,
                None => false,
            };
            if found == keep_found && self.emitted.insert(&doc)? {
                return Ok(Some(doc));
            }
        }
        self.close_left();
        self.phase = Phase::Done;
        Ok(None)
    }
}

impl<L: Operator, R: Operator, H: DocumentHasher> Operator for SetOpOperator<L, R, H> {
    fn next(&mut self) -> ExecutorResult<Option<Document>> {
        match self.op {
            SetOperator::Union | SetOperator::UnionAll => self.next_union(),
            SetOperator::Intersect | SetOperator::Except => self.next_filtered(),
        }
    }

    fn close(&mut self) {
        self.close_left();
        self.close_right();
        self.phase = Phase::Done;
    }
}
