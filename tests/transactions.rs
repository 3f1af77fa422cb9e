//! Transaction Tests
//!
//! - Uncommitted writes are invisible to other transactions
//! - Readers keep the snapshot they began with
//! - Read-only transactions reject mutations
//! - The in-memory engine admits a single writer

use tessera::engine::{
    Cursor, Engine, EngineError, IteratorOptions, MemoryEngine, Store, Transaction,
};
use tessera::{Database, Document, ErrorKind, FieldPath, Query, TableOptions, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn with_table() -> Database<MemoryEngine> {
    let db = Database::new(MemoryEngine::new());
    db.update(|tx| {
        tx.create_table("item", TableOptions::with_primary_key(FieldPath::field("id")))?;
        tx.insert("item", &Document::new().with("id", 1))?;
        Ok(())
    })
    .unwrap();
    db
}

fn count(db: &Database<MemoryEngine>) -> usize {
    db.view(|tx| Ok(tx.execute(&Query::new("item").into(), &[])?.len()))
        .unwrap()
}

// =============================================================================
// Isolation
// =============================================================================

#[test]
fn test_uncommitted_writes_invisible_to_reader() {
    let db = with_table();

    let writer = db.begin(true).unwrap();
    writer
        .insert("item", &Document::new().with("id", 2))
        .unwrap();

    let reader = db.begin(false).unwrap();
    let seen = reader.execute(&Query::new("item").into(), &[]).unwrap();
    assert_eq!(seen.len(), 1);

    // the writer sees its own write
    let own = writer.execute(&Query::new("item").into(), &[]).unwrap();
    assert_eq!(own.len(), 2);

    writer.commit().unwrap();

    // the reader keeps its snapshot after the commit
    let again = reader.execute(&Query::new("item").into(), &[]).unwrap();
    assert_eq!(again.len(), 1);
    reader.rollback().unwrap();

    assert_eq!(count(&db), 2);
}

#[test]
fn test_rollback_discards_writes() {
    let db = with_table();

    let tx = db.begin(true).unwrap();
    tx.insert("item", &Document::new().with("id", 2)).unwrap();
    tx.rollback().unwrap();

    assert_eq!(count(&db), 1);
}

#[test]
fn test_read_only_rejects_mutations() {
    let db = with_table();
    let tx = db.begin(false).unwrap();

    let err = tx
        .insert("item", &Document::new().with("id", 9))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);

    let err = tx.create_table("other", TableOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);
}

#[test]
fn test_single_writer() {
    let db = with_table();
    let first = db.begin(true).unwrap();

    let err = db.begin(true).err().map(|e| e.kind());
    assert_eq!(err, Some(ErrorKind::Storage));

    // readers are unaffected
    assert!(db.begin(false).is_ok());

    first.rollback().unwrap();
    assert!(db.begin(true).is_ok());
}

// =============================================================================
// Surrogate Keys
// =============================================================================

#[test]
fn test_surrogate_keys_increase() {
    let db = Database::new(MemoryEngine::new());
    let keys = db
        .update(|tx| {
            tx.create_table("log", TableOptions::default())?;
            let a = tx.insert("log", &Document::new().with("msg", "a"))?;
            let b = tx.insert("log", &Document::new().with("msg", "b"))?;
            Ok(vec![a, b])
        })
        .unwrap();

    assert!(keys[0] < keys[1]);
    assert!(matches!(keys[0], Value::Int(_)));
}

#[test]
fn test_rolled_back_sequence_is_reused() {
    let db = Database::new(MemoryEngine::new());
    db.update(|tx| {
        tx.create_table("log", TableOptions::default())?;
        Ok(())
    })
    .unwrap();

    let tx = db.begin(true).unwrap();
    let discarded = tx.insert("log", &Document::new()).unwrap();
    tx.rollback().unwrap();

    let kept = db.update(|tx| tx.insert("log", &Document::new())).unwrap();
    assert_eq!(discarded, kept);
}

// =============================================================================
// Engine Contract
// =============================================================================

#[test]
fn test_engine_put_then_get_and_ordered_iteration() {
    let engine = MemoryEngine::new();
    let tx = engine.begin(true).unwrap();
    tx.create_store("s").unwrap();
    {
        let store = tx.get_store("s").unwrap();
        store.put(b"b", b"2").unwrap();
        store.put(b"a", b"1").unwrap();
        store.put(b"c", b"3").unwrap();
        assert_eq!(store.get(b"a").unwrap(), b"1".to_vec());

        let mut cursor = store
            .iterator(IteratorOptions::default().reversed(true))
            .unwrap();
        let mut keys = Vec::new();
        while let Some((k, _)) = cursor.next().unwrap() {
            keys.push(k);
        }
        assert_eq!(keys, vec![b"c".to_vec(), b"b".to_vec(), b"a".to_vec()]);

        cursor.close();
        cursor.close();
        assert!(cursor.next().unwrap().is_none());

        assert_eq!(store.delete(b"zz"), Err(EngineError::KeyNotFound));
    }
    tx.commit().unwrap();
}

#[test]
fn test_engine_commit_read_only_fails() {
    let engine = MemoryEngine::new();
    let tx = engine.begin(false).unwrap();
    assert_eq!(tx.commit(), Err(EngineError::ReadOnly));
}
