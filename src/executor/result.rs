//! Result types for query execution

use crate::document::Document;

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::BoxedOperator;

/// Result of a query driven to completion
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Documents in result order
    pub documents: Vec<Document>,
    /// Number of documents read by scans
    pub scanned_count: usize,
    /// Number of documents returned
    pub returned_count: usize,
    /// Whether the caller's row cap stopped execution before the end
    pub stopped_early: bool,
}

impl ExecutionResult {
    /// Creates an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no documents matched
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the number of results
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns an iterator over the documents
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }
}

/// Forward-only stream of query results.
///
/// `next` returns `None` at the end of the stream and after an error; the
/// error stays available through `err`. The operator tree is closed at
/// the end of the stream, on error, on `close` and on drop.
pub struct Rows<'a> {
    root: BoxedOperator<'a>,
    err: Option<ExecutorError>,
    closed: bool,
    returned: usize,
}

impl<'a> Rows<'a> {
    pub fn new(root: BoxedOperator<'a>) -> Self {
        Self {
            root,
            err: None,
            closed: false,
            returned: 0,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Document> {
        if self.closed {
            return None;
        }
        match self.root.next() {
            Ok(Some(doc)) => {
                self.returned += 1;
                Some(doc)
            }
            Ok(None) => {
                self.close();
                None
            }
            Err(e) => {
                self.err = Some(e);
                self.close();
                None
            }
        }
    }

    /// The error that ended the stream, if any
    pub fn err(&self) -> Option<&ExecutorError> {
        self.err.as_ref()
    }

    /// Releases every cursor of the query. Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.root.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Documents returned so far
    pub fn returned(&self) -> usize {
        self.returned
    }

    /// Drains the stream, failing with the error that ended it
    pub fn try_collect(mut self) -> ExecutorResult<Vec<Document>> {
        let mut out = Vec::new();
        while let Some(doc) = self.next() {
            out.push(doc);
        }
        match self.err.take() {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }
}

impl Iterator for Rows<'_> {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        Rows::next(self)
    }
}

impl Drop for Rows<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::filters::FilterOperator;
    use crate::executor::operator::testing::Tracked;
    use crate::executor::operator::ValuesOperator;
    use crate::planner::Expr;

    fn docs(n: i64) -> Vec<Document> {
        (1..=n).map(|i| Document::new().with("id", i)).collect()
    }

    #[test]
    fn test_rows_close_on_exhaustion_and_drop() {
        let (root, closes, _) = Tracked::new(ValuesOperator::new(docs(2)));
        let mut rows = Rows::new(Box::new(root));
        assert!(rows.next().is_some());
        assert!(rows.next().is_some());
        assert!(rows.next().is_none());
        assert!(rows.is_closed());
        assert!(rows.err().is_none());
        drop(rows);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_rows_close_is_idempotent() {
        let (root, closes, _) = Tracked::new(ValuesOperator::new(docs(3)));
        let mut rows = Rows::new(Box::new(root));
        assert!(rows.next().is_some());
        rows.close();
        rows.close();
        assert!(rows.next().is_none());
        assert!(rows.err().is_none());
        assert_eq!(rows.returned(), 1);
        drop(rows);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_rows_error_slot() {
        let root = FilterOperator::new(
            ValuesOperator::new(docs(2)),
            Expr::eq(Expr::field("id"), Expr::param(1)),
        );
        let mut rows = Rows::new(Box::new(root));
        assert!(rows.next().is_none());
        assert!(matches!(
            rows.err(),
            Some(ExecutorError::UnboundParameter { position: 1 })
        ));
        assert!(rows.next().is_none());

        let root = FilterOperator::new(
            ValuesOperator::new(docs(2)),
            Expr::eq(Expr::field("id"), Expr::param(1)),
        );
        assert!(Rows::new(Box::new(root)).try_collect().is_err());
    }

    #[test]
    fn test_execution_result_empty() {
        let result = ExecutionResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
    }
}
