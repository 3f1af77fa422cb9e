//! Set Operator Tests
//!
//! DISTINCT, UNION, UNION ALL, INTERSECT and EXCEPT through the database
//! facade, with both document hashers.

use tessera::{
    Database, DatabaseConfig, Document, FieldPath, HasherKind, MemoryEngine, Query, Statement,
    TableOptions, Value,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn row(id: i64, name: &str) -> Document {
    Document::new().with("id", id).with("name", name)
}

fn open(hasher: HasherKind) -> Database<MemoryEngine> {
    let config = DatabaseConfig {
        distinct_hasher: hasher,
        ..DatabaseConfig::default()
    };
    let db = Database::with_config(MemoryEngine::new(), config);
    db.update(|tx| {
        let by_id = || TableOptions::with_primary_key(FieldPath::field("id"));
        tx.create_table("left", by_id())?;
        tx.create_table("right", by_id())?;
        tx.create_table("events", TableOptions::default())?;

        for doc in [row(1, "bar"), row(2, "baz"), row(3, "foo")] {
            tx.insert("left", &doc)?;
        }
        for doc in [row(1, "bar"), row(4, "qux"), row(3, "foo")] {
            tx.insert("right", &doc)?;
        }
        // surrogate keys, so identical documents can be stored twice
        for doc in [row(1, "bar"), row(1, "bar"), row(2, "baz")] {
            tx.insert("events", &doc)?;
        }
        Ok(())
    })
    .unwrap();
    db
}

fn run(db: &Database<MemoryEngine>, statement: Statement) -> Vec<Document> {
    db.view(|tx| Ok(tx.execute(&statement, &[])?.documents))
        .unwrap()
}

fn ids(docs: &[Document]) -> Vec<i64> {
    docs.iter()
        .filter_map(|d| d.get("id").and_then(Value::as_i64))
        .collect()
}

// =============================================================================
// DISTINCT
// =============================================================================

#[test]
fn test_distinct_drops_duplicate_documents() {
    for hasher in [HasherKind::Sip, HasherKind::Sha256] {
        let db = open(hasher);

        let all = run(&db, Query::new("events").into());
        assert_eq!(all.len(), 3);

        let distinct = run(&db, Query::new("events").distinct().into());
        assert_eq!(distinct, vec![row(1, "bar"), row(2, "baz")]);
    }
}

#[test]
fn test_distinct_after_projection() {
    let db = open(HasherKind::Sip);
    let names = run(
        &db,
        Query::new("events")
            .select_fields(["name"])
            .distinct()
            .into(),
    );
    assert_eq!(names.len(), 2);
}

// =============================================================================
// Compound Statements
// =============================================================================

#[test]
fn test_union_keeps_first_sightings() {
    let db = open(HasherKind::Sip);
    let docs = run(&db, Statement::union(Query::new("left"), Query::new("right")));
    assert_eq!(ids(&docs), vec![1, 2, 3, 4]);
}

#[test]
fn test_union_all_keeps_everything() {
    let db = open(HasherKind::Sip);
    let docs = run(
        &db,
        Statement::union_all(Query::new("left"), Query::new("right")),
    );
    assert_eq!(ids(&docs), vec![1, 2, 3, 1, 3, 4]);
}

#[test]
fn test_intersect() {
    for hasher in [HasherKind::Sip, HasherKind::Sha256] {
        let db = open(hasher);
        let docs = run(
            &db,
            Statement::intersect(Query::new("left"), Query::new("right")),
        );
        assert_eq!(ids(&docs), vec![1, 3]);
    }
}

#[test]
fn test_except() {
    let db = open(HasherKind::Sip);
    let docs = run(&db, Statement::except(Query::new("left"), Query::new("right")));
    assert_eq!(ids(&docs), vec![2]);
}

#[test]
fn test_nested_compound() {
    let db = open(HasherKind::Sip);
    // (left EXCEPT right) UNION events
    let docs = run(
        &db,
        Statement::union(
            Statement::except(Query::new("left"), Query::new("right")),
            Query::new("events"),
        ),
    );
    assert_eq!(ids(&docs), vec![2, 1]);
}

#[test]
fn test_compound_with_unknown_table_is_rejected() {
    let db = open(HasherKind::Sip);
    let err = db
        .view(|tx| {
            tx.execute(
                &Statement::union(Query::new("left"), Query::new("missing")),
                &[],
            )
        })
        .unwrap_err();
    assert_eq!(err.code(), "TESSERA_QUERY_UNKNOWN_TABLE");
}
