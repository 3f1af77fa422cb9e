//! Pull-based operator contract

use crate::document::Document;

use super::errors::ExecutorResult;

/// A streaming step of a query pipeline.
///
/// `next` computes a row only when asked. After the end of the stream, or
/// after `close`, `next` keeps returning `Ok(None)`. `close` releases every
/// cursor held by the operator and its inputs; it is idempotent and may be
/// called before exhaustion.
pub trait Operator {
    fn next(&mut self) -> ExecutorResult<Option<Document>>;

    fn close(&mut self);
}

/// Operator tree borrowing a transaction for `'a`
pub type BoxedOperator<'a> = Box<dyn Operator + 'a>;

impl<O: Operator + ?Sized> Operator for Box<O> {
    fn next(&mut self) -> ExecutorResult<Option<Document>> {
        (**self).next()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Operator over an in-memory list of documents
pub struct ValuesOperator {
    rows: std::vec::IntoIter<Document>,
    closed: bool,
}

impl ValuesOperator {
    pub fn new(rows: Vec<Document>) -> Self {
        Self {
            rows: rows.into_iter(),
            closed: false,
        }
    }
}

impl Operator for ValuesOperator {
    fn next(&mut self) -> ExecutorResult<Option<Document>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.rows.next())
    }

    fn close(&mut self) {
        self.closed = true;
        self.rows = Vec::new().into_iter();
    }
}
