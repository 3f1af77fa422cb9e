//! Predicate evaluation and filtering
//!
//! Comparisons follow `Value::compare_by_value`: numbers compare by value
//! across ints and floats, a Null operand makes the result Null, and
//! operands of different ranks are unequal (only `!=` holds). AND, OR and
//! NOT use three-valued logic where any non-boolean acts as Null.

use crate::document::{Document, Value};
use crate::planner::{CmpOp, Expr};

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::Operator;

/// Evaluates an expression against a document.
///
/// Missing fields evaluate to Null.
pub fn evaluate(expr: &Expr, doc: &Document) -> ExecutorResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Field(path) => Ok(doc.get_path(path).cloned().unwrap_or(Value::Null)),
        Expr::Param(position) => Err(ExecutorError::UnboundParameter {
            position: *position,
        }),
        Expr::Cmp { op, left, right } => {
            let left = evaluate(left, doc)?;
            let right = evaluate(right, doc)?;
            Ok(compare(*op, &left, &right))
        }
        Expr::And(l, r) => {
            let left = truth(&evaluate(l, doc)?);
            if left == Some(false) {
                return Ok(Value::Bool(false));
            }
            Ok(match (left, truth(&evaluate(r, doc)?)) {
                (_, Some(false)) => Value::Bool(false),
                (Some(true), Some(true)) => Value::Bool(true),
                _ => Value::Null,
            })
        }
        Expr::Or(l, r) => {
            let left = truth(&evaluate(l, doc)?);
            if left == Some(true) {
                return Ok(Value::Bool(true));
            }
            Ok(match (left, truth(&evaluate(r, doc)?)) {
                (_, Some(true)) => Value::Bool(true),
                (Some(false), Some(false)) => Value::Bool(false),
                _ => Value::Null,
            })
        }
        Expr::Not(e) => Ok(match truth(&evaluate(e, doc)?) {
            Some(b) => Value::Bool(!b),
            None => Value::Null,
        }),
    }
}

/// Returns true only when the predicate evaluates to `true`
pub fn matches(predicate: &Expr, doc: &Document) -> ExecutorResult<bool> {
    Ok(matches!(evaluate(predicate, doc)?, Value::Bool(true)))
}

fn truth(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Value {
    if left.is_null() || right.is_null() {
        return Value::Null;
    }
    let ordering = match left.compare_by_value(right) {
        Some(ordering) => ordering,
        None => return Value::Bool(op == CmpOp::Neq),
    };
    Value::Bool(match op {
        CmpOp::Eq => ordering.is_eq(),
        CmpOp::Neq => ordering.is_ne(),
        CmpOp::Lt => ordering.is_lt(),
        CmpOp::Lte => ordering.is_le(),
        CmpOp::Gt => ordering.is_gt(),
        CmpOp::Gte => ordering.is_ge(),
    })
}

/// Forwards the documents for which the predicate is true
pub struct FilterOperator<O> {
    input: O,
    predicate: Expr,
}

impl<O: Operator> FilterOperator<O> {
    pub fn new(input: O, predicate: Expr) -> Self {
        Self { input, predicate }
    }
}

impl<O: Operator> Operator for FilterOperator<O> {
    fn next(&mut self) -> ExecutorResult<Option<Document>> {
        while let Some(doc) = self.input.next()? {
            if matches(&self.predicate, &doc)? {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    fn close(&mut self) {
        self.input.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::operator::testing::drain;
    use crate::executor::operator::ValuesOperator;

    fn doc() -> Document {
        Document::new()
            .with("name", "Alice")
            .with("age", 30)
            .with("score", 1.5)
            .with("active", true)
            .with("tags", Value::Null)
    }

    fn check(expr: Expr) -> bool {
        matches(&expr, &doc()).unwrap()
    }

    #[test]
    fn test_equality_match() {
        assert!(check(Expr::eq(Expr::field("name"), Expr::lit("Alice"))));
        assert!(!check(Expr::eq(Expr::field("name"), Expr::lit("Bob"))));
    }

    #[test]
    fn test_no_cross_rank_coercion() {
        // text "30" never equals the integer 30
        assert!(!check(Expr::eq(Expr::field("age"), Expr::lit("30"))));
        assert!(check(Expr::neq(Expr::field("age"), Expr::lit("30"))));
        assert!(!check(Expr::lt(Expr::field("age"), Expr::lit("zzz"))));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(check(Expr::eq(Expr::field("age"), Expr::lit(30.0))));
        assert!(check(Expr::gt(Expr::field("score"), Expr::lit(1))));
        assert!(check(Expr::lte(Expr::lit(29), Expr::field("age"))));
    }

    #[test]
    fn test_null_and_missing_never_match() {
        assert!(!check(Expr::eq(Expr::field("tags"), Expr::lit(Value::Null))));
        assert!(!check(Expr::neq(Expr::field("missing"), Expr::lit(1))));
        assert_eq!(
            evaluate(&Expr::eq(Expr::field("missing"), Expr::lit(1)), &doc()).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_three_valued_logic() {
        let unknown = Expr::eq(Expr::field("missing"), Expr::lit(1));
        let yes = Expr::field("active");
        let no = Expr::eq(Expr::field("age"), Expr::lit(1));

        let eval = |e: Expr| evaluate(&e, &doc()).unwrap();
        assert_eq!(eval(unknown.clone().and(no.clone())), Value::Bool(false));
        assert_eq!(eval(unknown.clone().and(yes.clone())), Value::Null);
        assert_eq!(eval(unknown.clone().or(yes.clone())), Value::Bool(true));
        assert_eq!(eval(unknown.clone().or(no.clone())), Value::Null);
        assert_eq!(eval(unknown.not()), Value::Null);
        assert_eq!(eval(no.not()), Value::Bool(true));
    }

    #[test]
    fn test_non_boolean_predicate_excluded() {
        assert!(!check(Expr::field("name")));
        assert!(check(Expr::field("active")));
    }

    #[test]
    fn test_unbound_parameter_errors() {
        let err = matches(&Expr::eq(Expr::field("age"), Expr::param(1)), &doc()).unwrap_err();
        assert!(matches!(err, ExecutorError::UnboundParameter { position: 1 }));
    }

    #[test]
    fn test_filter_operator() {
        let rows = vec![
            Document::new().with("ID", 10).with("Name", "foo"),
            Document::new().with("ID", 1).with("Name", "bar"),
            Document::new().with("ID", 2).with("Name", "baz"),
        ];
        let mut filter = FilterOperator::new(
            ValuesOperator::new(rows),
            Expr::eq(Expr::field("Name"), Expr::lit("bar")),
        );
        let out = drain(&mut filter);
        assert_eq!(out, vec![Document::new().with("ID", 1).with("Name", "bar")]);

        filter.close();
        assert!(filter.next().unwrap().is_none());
    }
}
