//! Sort operator
//!
//! Sorting needs every row, so the first `next` drains the input into a
//! buffer. Keys compare with the total value order; a missing field sorts
//! as Null. The sort is stable, so ties keep their input order.

use std::cmp::Ordering;

use crate::document::{Document, Value};
use crate::planner::{SortDirection, SortSpec};

use super::errors::ExecutorResult;
use super::operator::Operator;

enum SortState {
    Buffering,
    Streaming(std::vec::IntoIter<Document>),
    Closed,
}

pub struct SortOperator<O> {
    input: O,
    keys: Vec<SortSpec>,
    state: SortState,
}

impl<O: Operator> SortOperator<O> {
    pub fn new(input: O, keys: Vec<SortSpec>) -> Self {
        Self {
            input,
            keys,
            state: SortState::Buffering,
        }
    }

    fn fill(&mut self) -> ExecutorResult<()> {
        let mut rows = Vec::new();
        while let Some(doc) = self.input.next()? {
            rows.push(doc);
        }
        sort_documents(&mut rows, &self.keys);
        self.state = SortState::Streaming(rows.into_iter());
        Ok(())
    }
}

/// Stable sort of documents by the given keys
pub fn sort_documents(rows: &mut [Document], keys: &[SortSpec]) {
    rows.sort_by(|a, b| compare_documents(a, b, keys));
}

fn compare_documents(a: &Document, b: &Document, keys: &[SortSpec]) -> Ordering {
    static NULL: Value = Value::Null;
    for key in keys {
        let left = a.get_path(&key.path).unwrap_or(&NULL);
        let right = b.get_path(&key.path).unwrap_or(&NULL);
        let ordering = match key.direction {
            SortDirection::Asc => left.cmp(right),
            SortDirection::Desc => right.cmp(left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl<O: Operator> Operator for SortOperator<O> {
    fn next(&mut self) -> ExecutorResult<Option<Document>> {
        if let SortState::Buffering = self.state {
            self.fill()?;
        }
        match &mut self.state {
            SortState::Streaming(rows) => Ok(rows.next()),
            SortState::Buffering | SortState::Closed => Ok(None),
        }
    }

    fn close(&mut self) {
        self.input.close();
        self.state = SortState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::operator::testing::{drain, Tracked};
    use crate::executor::operator::ValuesOperator;

    fn make_doc(id: &str, age: impl Into<Value>) -> Document {
        Document::new().with("_id", id).with("age", age)
    }

    fn ids(docs: &[Document]) -> Vec<String> {
        docs.iter()
            .filter_map(|d| d.get("_id").and_then(Value::as_str).map(String::from))
            .collect()
    }

    #[test]
    fn test_sort_ascending() {
        let input = ValuesOperator::new(vec![make_doc("c", 30), make_doc("a", 20), make_doc("b", 25)]);
        let mut op = SortOperator::new(input, vec![SortSpec::asc("age")]);
        assert_eq!(ids(&drain(&mut op)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_descending() {
        let input = ValuesOperator::new(vec![make_doc("c", 30), make_doc("a", 20), make_doc("b", 25)]);
        let mut op = SortOperator::new(input, vec![SortSpec::desc("age")]);
        assert_eq!(ids(&drain(&mut op)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_stable() {
        // Same age, original order preserved
        let input = ValuesOperator::new(vec![make_doc("a", 25), make_doc("b", 25), make_doc("c", 25)]);
        let mut op = SortOperator::new(input, vec![SortSpec::asc("age")]);
        assert_eq!(ids(&drain(&mut op)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mixed_types_and_missing() {
        let mut rows = vec![
            make_doc("text", "x"),
            make_doc("float", 2.5),
            Document::new().with("_id", "missing"),
            make_doc("int", 3),
            make_doc("bool", true),
        ];
        sort_documents(&mut rows, &[SortSpec::asc("age")]);
        assert_eq!(ids(&rows), vec!["missing", "bool", "float", "int", "text"]);
    }

    #[test]
    fn test_secondary_key() {
        let mut rows = vec![
            Document::new().with("_id", "a").with("g", 1).with("n", 2),
            Document::new().with("_id", "b").with("g", 0).with("n", 5),
            Document::new().with("_id", "c").with("g", 1).with("n", 1),
        ];
        sort_documents(&mut rows, &[SortSpec::desc("g"), SortSpec::asc("n")]);
        assert_eq!(ids(&rows), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_close_closes_input() {
        let (input, closes, _) = Tracked::new(ValuesOperator::new(vec![make_doc("a", 1)]));
        let mut op = SortOperator::new(input, vec![SortSpec::asc("age")]);
        op.close();
        op.close();
        assert!(op.next().unwrap().is_none());
        assert_eq!(closes.get(), 2);
    }
}
