//! Logical query description
//!
//! This is the tree an external parser produces. Statements are either a
//! single-table `Query` or a set-operator composition of two statements.

use std::fmt;

use crate::document::{FieldPath, Value};

use super::errors::{PlannerError, PlannerResult};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CmpOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Neq => "!=",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, CmpOp::Eq)
    }

    pub fn is_range(&self) -> bool {
        matches!(self, CmpOp::Lt | CmpOp::Lte | CmpOp::Gt | CmpOp::Gte)
    }

    /// The operator with its operands swapped (`5 < a` is `a > 5`)
    pub fn flip(&self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Eq,
            CmpOp::Neq => CmpOp::Neq,
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Lte => CmpOp::Gte,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Gte => CmpOp::Lte,
        }
    }
}

/// Predicate and projection expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Field(FieldPath),
    /// Positional parameter, 1-based
    Param(usize),
    Cmp {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// A top-level field
    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field(FieldPath::field(name))
    }

    pub fn path(path: FieldPath) -> Self {
        Expr::Field(path)
    }

    pub fn param(position: usize) -> Self {
        Expr::Param(position)
    }

    pub fn cmp(op: CmpOp, left: Expr, right: Expr) -> Self {
        Expr::Cmp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::cmp(CmpOp::Eq, left, right)
    }

    pub fn neq(left: Expr, right: Expr) -> Self {
        Self::cmp(CmpOp::Neq, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::cmp(CmpOp::Lt, left, right)
    }

    pub fn lte(left: Expr, right: Expr) -> Self {
        Self::cmp(CmpOp::Lte, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::cmp(CmpOp::Gt, left, right)
    }

    pub fn gte(left: Expr, right: Expr) -> Self {
        Self::cmp(CmpOp::Gte, left, right)
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Replaces positional parameters with their values
    pub fn bind(&self, params: &[Value]) -> PlannerResult<Expr> {
        Ok(match self {
            Expr::Param(position) => {
                let value = position
                    .checked_sub(1)
                    .and_then(|i| params.get(i))
                    .ok_or_else(|| PlannerError::unbound_parameter(*position))?;
                Expr::Literal(value.clone())
            }
            Expr::Literal(_) | Expr::Field(_) => self.clone(),
            Expr::Cmp { op, left, right } => Expr::cmp(*op, left.bind(params)?, right.bind(params)?),
            Expr::And(l, r) => l.bind(params)?.and(r.bind(params)?),
            Expr::Or(l, r) => l.bind(params)?.or(r.bind(params)?),
            Expr::Not(e) => e.bind(params)?.not(),
        })
    }

    /// Splits a chain of ANDs into its operands, left to right
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::And(l, r) => {
                let mut out = l.conjuncts();
                out.extend(r.conjuncts());
                out
            }
            other => vec![other],
        }
    }

    /// Rebuilds an AND chain; `None` for an empty list
    pub fn conjunction(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        exprs.into_iter().reduce(Expr::and)
    }

    /// Returns `(path, op, literal)` for `field op literal` in either order
    pub fn as_field_comparison(&self) -> Option<(&FieldPath, CmpOp, &Value)> {
        match self {
            Expr::Cmp { op, left, right } => match (left.as_ref(), right.as_ref()) {
                (Expr::Field(path), Expr::Literal(value)) => Some((path, *op, value)),
                (Expr::Literal(value), Expr::Field(path)) => Some((path, op.flip(), value)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Field(p) => write!(f, "{}", p),
            Expr::Param(i) => write!(f, "?{}", i),
            Expr::Cmp { op, left, right } => write!(f, "{} {} {}", left, op.as_str(), right),
            Expr::And(l, r) => write!(f, "({} AND {})", l, r),
            Expr::Or(l, r) => write!(f, "({} OR {})", l, r),
            Expr::Not(e) => write!(f, "NOT {}", e),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One ordering key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub path: FieldPath,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            path: FieldPath::field(field),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            path: FieldPath::field(field),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.direction.as_str())
    }
}

/// An entry of the projection list
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionItem {
    /// Every field of the source document
    Wildcard,
    Expr { expr: Expr, alias: Option<String> },
}

impl ProjectionItem {
    pub fn field(name: impl Into<String>) -> Self {
        ProjectionItem::Expr {
            expr: Expr::field(name),
            alias: None,
        }
    }

    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        ProjectionItem::Expr {
            expr,
            alias: Some(alias.into()),
        }
    }

    /// Output field name: the alias, the last path segment of a field,
    /// or the rendered expression
    pub fn output_name(&self) -> Option<String> {
        match self {
            ProjectionItem::Wildcard => None,
            ProjectionItem::Expr {
                alias: Some(alias), ..
            } => Some(alias.clone()),
            ProjectionItem::Expr {
                expr: Expr::Field(path),
                ..
            } => Some(path.last().to_string()),
            ProjectionItem::Expr { expr, .. } => Some(expr.to_string()),
        }
    }
}

/// A single-table query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub predicate: Option<Expr>,
    /// Empty means every field
    pub projection: Vec<ProjectionItem>,
    pub distinct: bool,
    pub order_by: Vec<SortSpec>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Forces a scan of the named index
    pub index_hint: Option<String>,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            predicate: None,
            projection: Vec::new(),
            distinct: false,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            index_hint: None,
        }
    }

    /// ANDs a predicate onto the existing one
    pub fn with_predicate(mut self, predicate: Expr) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn select(mut self, item: ProjectionItem) -> Self {
        self.projection.push(item);
        self
    }

    pub fn select_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection
            .extend(fields.into_iter().map(ProjectionItem::field));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn order_by(mut self, spec: SortSpec) -> Self {
        self.order_by.push(spec);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn use_index(mut self, index: impl Into<String>) -> Self {
        self.index_hint = Some(index.into());
        self
    }

    /// Returns true when the projection keeps documents unchanged
    pub fn projects_everything(&self) -> bool {
        self.projection
            .iter()
            .all(|item| matches!(item, ProjectionItem::Wildcard))
    }
}

/// Set operators combining two statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    /// Distinct rows of both sides
    Union,
    /// Every row of both sides
    UnionAll,
    /// Distinct rows of the left side also present on the right
    Intersect,
    /// Distinct rows of the left side absent from the right
    Except,
}

impl SetOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetOperator::Union => "UNION",
            SetOperator::UnionAll => "UNION ALL",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::Except => "EXCEPT",
        }
    }
}

/// Two statements joined by a set operator
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundQuery {
    pub op: SetOperator,
    pub left: Box<Statement>,
    pub right: Box<Statement>,
}

/// Root of a logical query
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Query),
    Compound(CompoundQuery),
}

impl Statement {
    pub fn compound(op: SetOperator, left: impl Into<Statement>, right: impl Into<Statement>) -> Self {
        Statement::Compound(CompoundQuery {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        })
    }

    pub fn union(left: impl Into<Statement>, right: impl Into<Statement>) -> Self {
        Self::compound(SetOperator::Union, left, right)
    }

    pub fn union_all(left: impl Into<Statement>, right: impl Into<Statement>) -> Self {
        Self::compound(SetOperator::UnionAll, left, right)
    }

    pub fn intersect(left: impl Into<Statement>, right: impl Into<Statement>) -> Self {
        Self::compound(SetOperator::Intersect, left, right)
    }

    pub fn except(left: impl Into<Statement>, right: impl Into<Statement>) -> Self {
        Self::compound(SetOperator::Except, left, right)
    }
}

impl From<Query> for Statement {
    fn from(query: Query) -> Self {
        Statement::Select(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = Query::new("user")
            .with_predicate(Expr::eq(Expr::field("Name"), Expr::lit("bar")))
            .with_predicate(Expr::gt(Expr::field("Age"), Expr::lit(10)))
            .order_by(SortSpec::asc("ID"))
            .with_limit(1)
            .with_offset(1);

        assert_eq!(query.table, "user");
        assert_eq!(query.predicate.as_ref().map(|p| p.conjuncts().len()), Some(2));
        assert!(query.projects_everything());
        assert_eq!(query.limit, Some(1));
    }

    #[test]
    fn test_bind_params() {
        let expr = Expr::eq(Expr::field("a"), Expr::param(1)).and(Expr::lt(Expr::param(2), Expr::field("b")));
        let bound = expr.bind(&[Value::Int(1), Value::from("x")]).unwrap();
        assert_eq!(bound.to_string(), "(a = 1 AND \"x\" < b)");

        let err = expr.bind(&[Value::Int(1)]).unwrap_err();
        assert_eq!(err.code().code(), "TESSERA_QUERY_UNBOUND_PARAMETER");
        assert!(Expr::param(0).bind(&[Value::Null]).is_err());
    }

    #[test]
    fn test_field_comparison_normalized() {
        let expr = Expr::lt(Expr::lit(5), Expr::field("a"));
        let (path, op, value) = expr.as_field_comparison().unwrap();
        assert_eq!(path, &FieldPath::field("a"));
        assert_eq!(op, CmpOp::Gt);
        assert_eq!(value, &Value::Int(5));

        assert!(Expr::eq(Expr::field("a"), Expr::field("b"))
            .as_field_comparison()
            .is_none());
    }

    #[test]
    fn test_projection_names() {
        let nested = ProjectionItem::Expr {
            expr: Expr::path(FieldPath::parse("address.city").unwrap()),
            alias: None,
        };
        assert_eq!(nested.output_name(), Some("city".into()));
        assert_eq!(
            ProjectionItem::aliased(Expr::field("a"), "b").output_name(),
            Some("b".into())
        );
        assert_eq!(ProjectionItem::Wildcard.output_name(), None);
    }

    #[test]
    fn test_conjunction_round_trip() {
        let parts = vec![
            Expr::eq(Expr::field("a"), Expr::lit(1)),
            Expr::eq(Expr::field("b"), Expr::lit(2)),
        ];
        let joined = Expr::conjunction(parts.clone()).unwrap();
        let split: Vec<Expr> = joined.conjuncts().into_iter().cloned().collect();
        assert_eq!(split, parts);
        assert_eq!(Expr::conjunction(Vec::new()), None);
    }
}
