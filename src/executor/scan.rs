//! Scan operators
//!
//! Table scans walk the primary-key store, index scans walk an index store
//! and fetch each referenced document. The key range is pushed down to the
//! storage cursor. Nothing is read until the first `next`.

use std::cell::Cell;
use std::rc::Rc;

use crate::document::Document;
use crate::engine::Transaction;
use crate::table::{IndexIter, KeyRange, Table, TableInfo, TableIter};

use super::errors::ExecutorResult;
use super::operator::Operator;

/// What a scan reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanSource {
    Table,
    Index(String),
}

enum ScanState<'a> {
    Pending,
    Table(TableIter<'a>),
    Index(IndexIter<'a>),
    Closed,
}

pub struct ScanOperator<'a> {
    tx: &'a dyn Transaction,
    table: TableInfo,
    source: ScanSource,
    range: KeyRange,
    reverse: bool,
    state: ScanState<'a>,
    scanned: Rc<Cell<usize>>,
}

impl<'a> ScanOperator<'a> {
    pub fn new(
        tx: &'a dyn Transaction,
        table: TableInfo,
        source: ScanSource,
        range: KeyRange,
        reverse: bool,
    ) -> Self {
        Self {
            tx,
            table,
            source,
            range,
            reverse,
            state: ScanState::Pending,
            scanned: Rc::new(Cell::new(0)),
        }
    }

    /// Shares a counter incremented for every document read
    pub fn with_counter(mut self, scanned: Rc<Cell<usize>>) -> Self {
        self.scanned = scanned;
        self
    }

    fn open(&mut self) -> ExecutorResult<()> {
        let table = Table::open(self.tx, self.table.clone())?;
        self.state = match &self.source {
            ScanSource::Table => ScanState::Table(table.iterate(&self.range, self.reverse)?),
            ScanSource::Index(name) => {
                ScanState::Index(table.scan_index(name, &self.range, self.reverse)?)
            }
        };
        Ok(())
    }
}

impl Operator for ScanOperator<'_> {
    fn next(&mut self) -> ExecutorResult<Option<Document>> {
        if let ScanState::Pending = self.state {
            self.open()?;
        }
        let item = match &mut self.state {
            ScanState::Table(iter) => iter.next(),
            ScanState::Index(iter) => iter.next(),
            ScanState::Pending | ScanState::Closed => None,
        };
        match item {
            Some(Ok((_, doc))) => {
                self.scanned.set(self.scanned.get() + 1);
                Ok(Some(doc))
            }
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        match &mut self.state {
            ScanState::Table(iter) => iter.close(),
            ScanState::Index(iter) => iter.close(),
            ScanState::Pending | ScanState::Closed => {}
        }
        self.state = ScanState::Closed;
    }
}
