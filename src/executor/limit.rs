//! Limit / offset

use crate::document::Document;

use super::errors::ExecutorResult;
use super::operator::Operator;

/// Skips `offset` documents, then passes at most `limit`.
///
/// Once the limit is reached the input is closed, so upstream work stops.
pub struct LimitOperator<O> {
    input: O,
    limit: Option<u64>,
    offset: u64,
    skipped: u64,
    emitted: u64,
    done: bool,
}

impl<O: Operator> LimitOperator<O> {
    pub fn new(input: O, limit: Option<u64>, offset: u64) -> Self {
        Self {
            input,
            limit,
            offset,
            skipped: 0,
            emitted: 0,
            done: false,
        }
    }

    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            self.input.close();
        }
    }
}

impl<O: Operator> Operator for LimitOperator<O> {
    fn next(&mut self) -> ExecutorResult<Option<Document>> {
        if self.done {
            return Ok(None);
        }
        if self.limit == Some(self.emitted) {
            self.finish();
            return Ok(None);
        }
        while self.skipped < self.offset {
            if self.input.next()?.is_none() {
                self.finish();
                return Ok(None);
            }
            self.skipped += 1;
        }
        match self.input.next()? {
            Some(doc) => {
                self.emitted += 1;
                if self.limit == Some(self.emitted) {
                    self.finish();
                }
                Ok(Some(doc))
            }
            None => {
                self.finish();
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        self.finish();
    }
}
