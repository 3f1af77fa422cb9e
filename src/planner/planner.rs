//! Query planner
//!
//! Produces deterministic plan trees. Scan selection priority (strict
//! order):
//! 1. Primary key equality
//! 2. Indexed equality
//! 3. Primary key range
//! 4. Indexed range
//! 5. Primary key matching a single ordering key, or an index matching a
//!    single ascending one
//! 6. Full table scan
//!
//! Ties broken lexicographically by field path, then index name.
//!
//! Equality on a bool, text, blob, array or document literal is answered
//! exactly by the scan and leaves the residual filter. Numeric equality
//! and ranges only narrow the scan; their conditions stay in the filter.
//!
//! Operators nest as Scan -> Filter -> Sort -> Projection -> Distinct ->
//! Limit, so ordering keys may reference fields the projection drops.

use crate::document::{FieldPath, Value, ValueType};
use crate::table::{CatalogSnapshot, IndexInfo, TableInfo};

use super::ast::{CmpOp, Expr, ProjectionItem, Query, SetOperator, SortDirection, SortSpec, Statement};
use super::bounds::ScanRange;
use super::errors::{PlannerError, PlannerResult};

/// Catalog metadata the planner reads
pub trait CatalogView {
    fn table(&self, name: &str) -> Option<&TableInfo>;
}

impl CatalogView for CatalogSnapshot {
    fn table(&self, name: &str) -> Option<&TableInfo> {
        self.get(name)
    }
}

/// How a scan was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanType {
    PrimaryKeyEquality,
    IndexedEquality,
    PrimaryKeyRange,
    IndexedRange,
    /// Chosen for its natural order or by an index hint
    OrderedScan,
    FullScan,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::PrimaryKeyEquality => "PK_EQ",
            ScanType::IndexedEquality => "INDEX_EQ",
            ScanType::PrimaryKeyRange => "PK_RANGE",
            ScanType::IndexedRange => "INDEX_RANGE",
            ScanType::OrderedScan => "ORDERED",
            ScanType::FullScan => "FULL",
        }
    }
}

/// A field produced by a projection
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedField {
    /// Every field of the input document
    Wildcard,
    Named { name: String, expr: Expr },
}

/// Node of an immutable plan tree
#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    TableScan {
        table: TableInfo,
        scan: ScanType,
        range: ScanRange,
        reverse: bool,
    },
    IndexScan {
        table: TableInfo,
        index: IndexInfo,
        scan: ScanType,
        range: ScanRange,
        reverse: bool,
    },
    Filter {
        input: Box<PlanNode>,
        predicate: Expr,
    },
    Sort {
        input: Box<PlanNode>,
        keys: Vec<SortSpec>,
    },
    Projection {
        input: Box<PlanNode>,
        fields: Vec<ProjectedField>,
    },
    Distinct {
        input: Box<PlanNode>,
    },
    Limit {
        input: Box<PlanNode>,
        limit: Option<u64>,
        offset: u64,
    },
    SetOp {
        op: SetOperator,
        left: Box<PlanNode>,
        right: Box<PlanNode>,
    },
}

impl PlanNode {
    /// One-line description used by explain output
    pub fn label(&self) -> String {
        match self {
            PlanNode::TableScan {
                table,
                scan,
                range,
                reverse,
            } => format!(
                "TableScan table={} type={} range={}{}",
                table.name,
                scan.as_str(),
                range,
                if *reverse { " reverse" } else { "" }
            ),
            PlanNode::IndexScan {
                table,
                index,
                scan,
                range,
                reverse,
            } => format!(
                "IndexScan table={} index={} on={} type={} range={}{}",
                table.name,
                index.name,
                index.path,
                scan.as_str(),
                range,
                if *reverse { " reverse" } else { "" }
            ),
            PlanNode::Filter { predicate, .. } => format!("Filter {}", predicate),
            PlanNode::Sort { keys, .. } => {
                let keys: Vec<String> = keys.iter().map(SortSpec::to_string).collect();
                format!("Sort {}", keys.join(", "))
            }
            PlanNode::Projection { fields, .. } => {
                let names: Vec<String> = fields
                    .iter()
                    .map(|f| match f {
                        ProjectedField::Wildcard => "*".to_string(),
                        ProjectedField::Named { name, expr } => {
                            if expr.to_string() == *name {
                                name.clone()
                            } else {
                                format!("{} AS {}", expr, name)
                            }
                        }
                    })
                    .collect();
                format!("Projection {}", names.join(", "))
            }
            PlanNode::Distinct { .. } => "Distinct".to_string(),
            PlanNode::Limit { limit, offset, .. } => match limit {
                Some(limit) => format!("Limit limit={} offset={}", limit, offset),
                None => format!("Limit offset={}", offset),
            },
            PlanNode::SetOp { op, .. } => op.as_str().to_string(),
        }
    }

    /// Direct inputs, left to right
    pub fn children(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::TableScan { .. } | PlanNode::IndexScan { .. } => Vec::new(),
            PlanNode::Filter { input, .. }
            | PlanNode::Sort { input, .. }
            | PlanNode::Projection { input, .. }
            | PlanNode::Distinct { input }
            | PlanNode::Limit { input, .. } => vec![input.as_ref()],
            PlanNode::SetOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }
}

/// Immutable query plan (no runtime state)
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub root: PlanNode,
}

/// Where a scan reads from
#[derive(Debug, Clone, Copy)]
enum Access<'t> {
    PrimaryKey,
    Index(&'t IndexInfo),
}

/// `field op literal` conjunct usable to narrow a scan
struct Candidate<'q> {
    position: usize,
    path: &'q FieldPath,
    op: CmpOp,
    value: &'q Value,
}

struct ScanChoice {
    node: PlanNode,
    /// Conjunct answered exactly by the scan
    absorbed: Option<usize>,
    /// Whether the scan already yields the requested order
    ordered: bool,
}

/// Query planner that produces deterministic plans
pub struct QueryPlanner<'a, C: CatalogView> {
    catalog: &'a C,
}

impl<'a, C: CatalogView> QueryPlanner<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Plans a statement, binding positional parameters from `params`.
    ///
    /// Performs no I/O. Same statement and catalog give the same plan.
    pub fn plan(&self, statement: &Statement, params: &[Value]) -> PlannerResult<QueryPlan> {
        Ok(QueryPlan {
            root: self.plan_statement(statement, params)?,
        })
    }

    fn plan_statement(&self, statement: &Statement, params: &[Value]) -> PlannerResult<PlanNode> {
        match statement {
            Statement::Select(query) => self.plan_query(query, params),
            Statement::Compound(compound) => Ok(PlanNode::SetOp {
                op: compound.op,
                left: Box::new(self.plan_statement(&compound.left, params)?),
                right: Box::new(self.plan_statement(&compound.right, params)?),
            }),
        }
    }

    fn plan_query(&self, query: &Query, params: &[Value]) -> PlannerResult<PlanNode> {
        if query.table.is_empty() {
            return Err(PlannerError::query_invalid("Query must name a table"));
        }
        let info = self
            .catalog
            .table(&query.table)
            .ok_or_else(|| PlannerError::unknown_table(&query.table))?;

        let predicate = query
            .predicate
            .as_ref()
            .map(|p| p.bind(params))
            .transpose()?;
        let conjuncts: Vec<&Expr> = predicate.as_ref().map(Expr::conjuncts).unwrap_or_default();
        let fields = project_fields(query, params)?;

        // 1. Scan
        let choice = select_scan(info, &conjuncts, &query.order_by, query.index_hint.as_deref())?;
        let mut node = choice.node;

        // 2. Residual filter
        let residual = Expr::conjunction(
            conjuncts
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != choice.absorbed)
                .map(|(_, c)| (*c).clone()),
        );
        if let Some(predicate) = residual {
            node = PlanNode::Filter {
                input: Box::new(node),
                predicate,
            };
        }

        // 3. Sort, unless the scan already yields the requested order
        if !choice.ordered {
            node = PlanNode::Sort {
                input: Box::new(node),
                keys: query.order_by.clone(),
            };
        }

        // 4. Projection
        if !query.projects_everything() {
            node = PlanNode::Projection {
                input: Box::new(node),
                fields,
            };
        }

        // 5. Distinct
        if query.distinct {
            node = PlanNode::Distinct {
                input: Box::new(node),
            };
        }

        // 6. Limit / offset
        let offset = query.offset.unwrap_or(0);
        if query.limit.is_some() || offset > 0 {
            node = PlanNode::Limit {
                input: Box::new(node),
                limit: query.limit,
                offset,
            };
        }

        Ok(node)
    }
}

fn project_fields(query: &Query, params: &[Value]) -> PlannerResult<Vec<ProjectedField>> {
    let mut fields = Vec::with_capacity(query.projection.len());
    let mut seen: Vec<String> = Vec::new();
    for item in &query.projection {
        match item {
            ProjectionItem::Wildcard => fields.push(ProjectedField::Wildcard),
            ProjectionItem::Expr { expr, .. } => {
                let name = item.output_name().unwrap_or_default();
                if seen.contains(&name) {
                    return Err(PlannerError::query_invalid(format!(
                        "Projection produces field '{}' twice",
                        name
                    )));
                }
                seen.push(name.clone());
                fields.push(ProjectedField::Named {
                    name,
                    expr: expr.bind(params)?,
                });
            }
        }
    }
    Ok(fields)
}

/// Equality answered exactly by comparing encoded keys.
///
/// Numbers are excluded: the scan matches ints and floats of the same
/// magnitude together, so the filter has to keep the condition.
fn is_exact_equality(value: &Value) -> bool {
    matches!(
        value.value_type(),
        ValueType::Bool | ValueType::Text | ValueType::Blob | ValueType::Array | ValueType::Document
    )
}

fn select_scan(
    info: &TableInfo,
    conjuncts: &[&Expr],
    order_by: &[SortSpec],
    hint: Option<&str>,
) -> PlannerResult<ScanChoice> {
    let candidates: Vec<Candidate<'_>> = conjuncts
        .iter()
        .enumerate()
        .filter_map(|(position, c)| {
            let (path, op, value) = c.as_field_comparison()?;
            if op == CmpOp::Neq || value.is_null() {
                return None;
            }
            Some(Candidate {
                position,
                path,
                op,
                value,
            })
        })
        .collect();

    if let Some(hint) = hint {
        let index = info
            .index(hint)
            .ok_or_else(|| PlannerError::unknown_index(&info.name, hint))?;
        return Ok(scan_on(info, Access::Index(index), &candidates, order_by));
    }

    let pk = info.primary_key.as_ref();
    let is_pk = |c: &Candidate<'_>| pk == Some(c.path);
    let first_index = |c: &Candidate<'_>| info.indexes_on(c.path).into_iter().next();

    // 1. Primary key equality
    if candidates.iter().any(|c| c.op.is_equality() && is_pk(c)) {
        return Ok(scan_on(info, Access::PrimaryKey, &candidates, order_by));
    }

    // 2. Indexed equality
    if let Some(index) = best_index(&candidates, CmpOp::is_equality, first_index) {
        return Ok(scan_on(info, Access::Index(index), &candidates, order_by));
    }

    // 3. Primary key range
    if candidates.iter().any(|c| c.op.is_range() && is_pk(c)) {
        return Ok(scan_on(info, Access::PrimaryKey, &candidates, order_by));
    }

    // 4. Indexed range
    if let Some(index) = best_index(&candidates, CmpOp::is_range, first_index) {
        return Ok(scan_on(info, Access::Index(index), &candidates, order_by));
    }

    // 5. Natural order matching the only ordering key
    if let [only] = order_by {
        if pk == Some(&only.path) {
            return Ok(scan_on(info, Access::PrimaryKey, &[], order_by));
        }
        if only.direction == SortDirection::Asc {
            if let Some(index) = info.indexes_on(&only.path).into_iter().next() {
                return Ok(scan_on(info, Access::Index(index), &[], order_by));
            }
        }
    }

    // 6. Full scan
    Ok(scan_on(info, Access::PrimaryKey, &[], order_by))
}

/// Lexicographically first (path, index name) among indexed candidates
/// whose operator satisfies `accept`
fn best_index<'t>(
    candidates: &[Candidate<'_>],
    accept: fn(&CmpOp) -> bool,
    index_for: impl Fn(&Candidate<'_>) -> Option<&'t IndexInfo>,
) -> Option<&'t IndexInfo> {
    candidates
        .iter()
        .filter(|c| accept(&c.op))
        .filter_map(|c| index_for(c))
        .min_by(|a, b| a.path.cmp(&b.path).then_with(|| a.name.cmp(&b.name)))
}

/// Builds the scan node for `access`, narrowing it with the candidates on
/// the accessed field
fn scan_on(
    info: &TableInfo,
    access: Access<'_>,
    candidates: &[Candidate<'_>],
    order_by: &[SortSpec],
) -> ScanChoice {
    let natural = match access {
        Access::PrimaryKey => info.primary_key.clone(),
        Access::Index(index) => Some(index.path.clone()),
    };
    let on_field: Vec<&Candidate<'_>> = match &natural {
        Some(path) => candidates.iter().filter(|c| c.path == path).collect(),
        None => Vec::new(),
    };

    let mut range = ScanRange::all();
    let mut absorbed = None;
    let equality = on_field.iter().find(|c| c.op.is_equality());
    let scan = if let Some(eq) = equality {
        range = ScanRange::eq(eq.value.clone());
        if is_exact_equality(eq.value) {
            absorbed = Some(eq.position);
        }
        match access {
            Access::PrimaryKey => ScanType::PrimaryKeyEquality,
            Access::Index(_) => ScanType::IndexedEquality,
        }
    } else if let Some(first) = on_field.iter().find(|c| c.op.is_range()) {
        // Bounds of different ranks cannot form one key range
        let rank = first.value.value_type().rank();
        for c in on_field
            .iter()
            .filter(|c| c.op.is_range() && c.value.value_type().rank() == rank)
        {
            range.restrict(c.op, c.value);
        }
        match access {
            Access::PrimaryKey => ScanType::PrimaryKeyRange,
            Access::Index(_) => ScanType::IndexedRange,
        }
    } else {
        match (access, order_by) {
            (Access::Index(_), _) => ScanType::OrderedScan,
            (Access::PrimaryKey, [only]) if natural.as_ref() == Some(&only.path) => {
                ScanType::OrderedScan
            }
            _ => ScanType::FullScan,
        }
    };

    // Equal index keys come back in ascending key order either way, so only
    // a unique primary key can be read backwards in place of a sort
    let (ordered, reverse) = match order_by {
        [] => (true, false),
        [only] if natural.as_ref() == Some(&only.path) => match (access, only.direction) {
            (_, SortDirection::Asc) => (true, false),
            (Access::PrimaryKey, SortDirection::Desc) => (true, true),
            (Access::Index(_), SortDirection::Desc) => (false, false),
        },
        _ => (false, false),
    };

    let node = match access {
        Access::PrimaryKey => PlanNode::TableScan {
            table: info.clone(),
            scan,
            range,
            reverse,
        },
        Access::Index(index) => PlanNode::IndexScan {
            table: info.clone(),
            index: index.clone(),
            scan,
            range,
            reverse,
        },
    };

    ScanChoice {
        node,
        absorbed,
        ordered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::IndexInfo;

    fn user_table(indexes: &[&str]) -> TableInfo {
        TableInfo {
            name: "user".into(),
            store: "t:user".into(),
            primary_key: Some(FieldPath::field("ID")),
            indexes: indexes
                .iter()
                .map(|f| IndexInfo {
                    name: format!("idx_{}", f),
                    path: FieldPath::field(*f),
                    store: format!("i:user:idx_{}", f),
                })
                .collect(),
        }
    }

    fn catalog(indexes: &[&str]) -> CatalogSnapshot {
        CatalogSnapshot::from_tables([user_table(indexes)])
    }

    fn plan(catalog: &CatalogSnapshot, query: Query) -> PlannerResult<PlanNode> {
        QueryPlanner::new(catalog)
            .plan(&Statement::Select(query), &[])
            .map(|p| p.root)
    }

    fn scan_of(node: &PlanNode) -> &PlanNode {
        match node.children().into_iter().next() {
            Some(child) => scan_of(child),
            None => node,
        }
    }

    fn eq(field: &str, value: impl Into<Value>) -> Expr {
        Expr::eq(Expr::field(field), Expr::lit(value))
    }

    #[test]
    fn test_pk_equality_plan() {
        let catalog = catalog(&["Name"]);
        let root = plan(
            &catalog,
            Query::new("user")
                .with_predicate(eq("Name", "bar"))
                .with_predicate(eq("ID", 1)),
        )
        .unwrap();

        match scan_of(&root) {
            PlanNode::TableScan { scan, range, .. } => {
                assert_eq!(*scan, ScanType::PrimaryKeyEquality);
                assert_eq!(*range, ScanRange::eq(Value::Int(1)));
            }
            other => panic!("unexpected scan {:?}", other),
        }
        // numeric equality stays in the filter
        match &root {
            PlanNode::Filter { predicate, .. } => assert_eq!(predicate.conjuncts().len(), 2),
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_indexed_equality_absorbed() {
        let catalog = catalog(&["Name"]);
        let root = plan(&catalog, Query::new("user").with_predicate(eq("Name", "bar"))).unwrap();

        match &root {
            PlanNode::IndexScan {
                index, scan, range, ..
            } => {
                assert_eq!(index.name, "idx_Name");
                assert_eq!(*scan, ScanType::IndexedEquality);
                assert_eq!(*range, ScanRange::eq(Value::from("bar")));
            }
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_unindexed_equality_is_full_scan_with_filter() {
        let catalog = catalog(&[]);
        let root = plan(&catalog, Query::new("user").with_predicate(eq("Name", "bar"))).unwrap();

        match &root {
            PlanNode::Filter { input, predicate } => {
                assert_eq!(predicate.to_string(), "Name = \"bar\"");
                assert!(matches!(
                    input.as_ref(),
                    PlanNode::TableScan {
                        scan: ScanType::FullScan,
                        ..
                    }
                ));
            }
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_indexed_range_plan() {
        let catalog = catalog(&["Age"]);
        let root = plan(
            &catalog,
            Query::new("user")
                .with_predicate(Expr::gte(Expr::field("Age"), Expr::lit(18)))
                .with_predicate(Expr::lt(Expr::field("Age"), Expr::lit(30))),
        )
        .unwrap();

        match scan_of(&root) {
            PlanNode::IndexScan { scan, range, .. } => {
                assert_eq!(*scan, ScanType::IndexedRange);
                assert_eq!(range.to_string(), "[18, 30)");
            }
            other => panic!("unexpected scan {:?}", other),
        }
        assert!(matches!(root, PlanNode::Filter { .. }));
    }

    #[test]
    fn test_equality_beats_range() {
        let catalog = catalog(&["Age", "Name"]);
        let root = plan(
            &catalog,
            Query::new("user")
                .with_predicate(Expr::gt(Expr::field("ID"), Expr::lit(3)))
                .with_predicate(eq("Name", "bar")),
        )
        .unwrap();
        assert!(matches!(
            scan_of(&root),
            PlanNode::IndexScan {
                scan: ScanType::IndexedEquality,
                ..
            }
        ));
    }

    #[test]
    fn test_lexicographic_index_selection() {
        let catalog = catalog(&["zebra", "alpha", "beta"]);
        let root = plan(
            &catalog,
            Query::new("user")
                .with_predicate(eq("zebra", "z"))
                .with_predicate(eq("beta", "b"))
                .with_predicate(eq("alpha", "a")),
        )
        .unwrap();
        match scan_of(&root) {
            PlanNode::IndexScan { index, .. } => assert_eq!(index.name, "idx_alpha"),
            other => panic!("unexpected scan {:?}", other),
        }
    }

    #[test]
    fn test_sort_satisfied_by_primary_key() {
        let catalog = catalog(&[]);
        let root = plan(
            &catalog,
            Query::new("user")
                .order_by(SortSpec::desc("ID"))
                .with_limit(1)
                .with_offset(1),
        )
        .unwrap();

        match &root {
            PlanNode::Limit {
                input,
                limit,
                offset,
            } => {
                assert_eq!((*limit, *offset), (Some(1), 1));
                assert!(matches!(
                    input.as_ref(),
                    PlanNode::TableScan {
                        scan: ScanType::OrderedScan,
                        reverse: true,
                        ..
                    }
                ));
            }
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_sort_kept_for_unindexed_field() {
        let catalog = catalog(&[]);
        let root = plan(
            &catalog,
            Query::new("user")
                .select_fields(["Name"])
                .order_by(SortSpec::asc("Age")),
        )
        .unwrap();

        // sort sits below the projection
        match &root {
            PlanNode::Projection { input, .. } => {
                assert!(matches!(input.as_ref(), PlanNode::Sort { .. }))
            }
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_order_uses_index() {
        let catalog = catalog(&["Age"]);
        let root = plan(&catalog, Query::new("user").order_by(SortSpec::asc("Age"))).unwrap();
        assert!(matches!(
            root,
            PlanNode::IndexScan {
                scan: ScanType::OrderedScan,
                reverse: false,
                ..
            }
        ));
    }

    #[test]
    fn test_descending_order_on_index_is_sorted() {
        let catalog = catalog(&["Age"]);
        let root = plan(&catalog, Query::new("user").order_by(SortSpec::desc("Age"))).unwrap();
        // ties must keep key order, which a backwards index scan would reverse
        match &root {
            PlanNode::Sort { input, .. } => {
                assert!(matches!(
                    input.as_ref(),
                    PlanNode::TableScan { reverse: false, .. }
                ))
            }
            other => panic!("unexpected root {:?}", other),
        }

        let hinted = plan(
            &catalog,
            Query::new("user")
                .order_by(SortSpec::desc("Age"))
                .use_index("idx_Age"),
        )
        .unwrap();
        match &hinted {
            PlanNode::Sort { input, .. } => assert!(matches!(
                input.as_ref(),
                PlanNode::IndexScan { reverse: false, .. }
            )),
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_distinct_and_set_operators() {
        let catalog = catalog(&[]);
        let statement = Statement::except(
            Query::new("user").select_fields(["Name"]).distinct(),
            Query::new("user").select_fields(["Name"]),
        );
        let root = QueryPlanner::new(&catalog).plan(&statement, &[]).unwrap().root;

        match &root {
            PlanNode::SetOp { op, left, right } => {
                assert_eq!(*op, SetOperator::Except);
                assert!(matches!(left.as_ref(), PlanNode::Distinct { .. }));
                assert!(matches!(right.as_ref(), PlanNode::Projection { .. }));
            }
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_planning_errors() {
        let catalog = catalog(&[]);
        let planner = QueryPlanner::new(&catalog);

        let err = planner
            .plan(&Query::new("missing").into(), &[])
            .unwrap_err();
        assert_eq!(err.code().code(), "TESSERA_QUERY_UNKNOWN_TABLE");

        let err = planner
            .plan(&Query::new("user").use_index("nope").into(), &[])
            .unwrap_err();
        assert_eq!(err.code().code(), "TESSERA_QUERY_UNKNOWN_INDEX");

        let err = planner
            .plan(
                &Query::new("user")
                    .with_predicate(Expr::eq(Expr::field("ID"), Expr::param(1)))
                    .into(),
                &[],
            )
            .unwrap_err();
        assert_eq!(err.code().code(), "TESSERA_QUERY_UNBOUND_PARAMETER");

        let err = planner
            .plan(&Query::new("user").select_fields(["a", "a"]).into(), &[])
            .unwrap_err();
        assert_eq!(err.code().code(), "TESSERA_QUERY_INVALID");
    }

    #[test]
    fn test_params_bound_before_scan_selection() {
        let catalog = catalog(&["Name"]);
        let root = QueryPlanner::new(&catalog)
            .plan(
                &Query::new("user")
                    .with_predicate(Expr::eq(Expr::field("Name"), Expr::param(1)))
                    .into(),
                &[Value::from("bar")],
            )
            .unwrap()
            .root;
        assert!(matches!(
            root,
            PlanNode::IndexScan {
                scan: ScanType::IndexedEquality,
                ..
            }
        ));
    }

    #[test]
    fn test_deterministic_planning() {
        let catalog = catalog(&["Name", "Age"]);
        let query = Query::new("user")
            .with_predicate(eq("Name", "bar"))
            .with_predicate(Expr::gte(Expr::field("Age"), Expr::lit(18)));

        let first = plan(&catalog, query.clone()).unwrap();
        let second = plan(&catalog, query).unwrap();
        assert_eq!(first, second);
    }
}
