//! In-memory storage backend
//!
//! Committed state is an immutable snapshot behind an `Arc`. A transaction
//! starts from the snapshot current at `begin` and copies on first write,
//! so readers never observe uncommitted data. Only one writable transaction
//! may be active at a time; `commit` publishes its snapshot atomically.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::trace;

use super::errors::{EngineError, EngineResult};
use super::{is_satisfiable, Cursor, Engine, IteratorOptions, Store, Transaction};

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

#[derive(Debug, Clone, Default)]
struct StoreData {
    entries: Arc<Entries>,
    sequence: u64,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    stores: BTreeMap<String, StoreData>,
}

#[derive(Debug, Default)]
struct Shared {
    committed: RwLock<Arc<Snapshot>>,
    writer_active: AtomicBool,
}

/// Process-local engine. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    shared: Arc<Shared>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Engine for MemoryEngine {
    fn begin(&self, writable: bool) -> EngineResult<Box<dyn Transaction>> {
        if writable
            && self
                .shared
                .writer_active
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return Err(EngineError::WriterBusy);
        }

        // From here on the transaction owns the writer slot and releases it on drop
        let tx = MemoryTransaction {
            shared: Arc::clone(&self.shared),
            snapshot: RefCell::new(Arc::new(Snapshot::default())),
            writable,
        };
        let committed = self
            .shared
            .committed
            .read()
            .map_err(|_| EngineError::Backend("snapshot lock poisoned".into()))?;
        *tx.snapshot.borrow_mut() = Arc::clone(&committed);
        drop(committed);

        trace!(writable, "memory transaction started");
        Ok(Box::new(tx))
    }
}

struct MemoryTransaction {
    shared: Arc<Shared>,
    snapshot: RefCell<Arc<Snapshot>>,
    writable: bool,
}

impl MemoryTransaction {
    fn require_writable(&self) -> EngineResult<()> {
        if self.writable {
            Ok(())
        } else {
            Err(EngineError::ReadOnly)
        }
    }

    fn read_store<T>(&self, name: &str, f: impl FnOnce(&StoreData) -> T) -> EngineResult<T> {
        let snapshot = self.snapshot.borrow();
        snapshot
            .stores
            .get(name)
            .map(f)
            .ok_or_else(|| EngineError::StoreNotFound(name.to_string()))
    }

    fn write_store<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut StoreData) -> EngineResult<T>,
    ) -> EngineResult<T> {
        self.require_writable()?;
        let mut snapshot = self.snapshot.borrow_mut();
        let store = Arc::make_mut(&mut *snapshot)
            .stores
            .get_mut(name)
            .ok_or_else(|| EngineError::StoreNotFound(name.to_string()))?;
        f(store)
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if self.writable {
            self.shared.writer_active.store(false, Ordering::Release);
        }
    }
}

impl Transaction for MemoryTransaction {
    fn is_writable(&self) -> bool {
        self.writable
    }

    fn get_store<'a>(&'a self, name: &str) -> EngineResult<Box<dyn Store<'a> + 'a>> {
        self.read_store(name, |_| ())?;
        Ok(Box::new(MemoryStore {
            tx: self,
            name: name.to_string(),
        }))
    }

    fn create_store(&self, name: &str) -> EngineResult<()> {
        self.require_writable()?;
        let mut snapshot = self.snapshot.borrow_mut();
        let stores = &mut Arc::make_mut(&mut *snapshot).stores;
        if stores.contains_key(name) {
            return Err(EngineError::StoreExists(name.to_string()));
        }
        stores.insert(name.to_string(), StoreData::default());
        Ok(())
    }

    fn drop_store(&self, name: &str) -> EngineResult<()> {
        self.require_writable()?;
        let mut snapshot = self.snapshot.borrow_mut();
        Arc::make_mut(&mut *snapshot)
            .stores
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EngineError::StoreNotFound(name.to_string()))
    }

    fn list_stores(&self) -> EngineResult<Vec<String>> {
        Ok(self.snapshot.borrow().stores.keys().cloned().collect())
    }

    fn commit(self: Box<Self>) -> EngineResult<()> {
        self.require_writable()?;
        let mut committed = self
            .shared
            .committed
            .write()
            .map_err(|_| EngineError::Backend("snapshot lock poisoned".into()))?;
        *committed = Arc::clone(&self.snapshot.borrow());
        trace!("memory transaction committed");
        Ok(())
    }

    fn rollback(self: Box<Self>) -> EngineResult<()> {
        trace!(writable = self.writable, "memory transaction rolled back");
        Ok(())
    }
}

struct MemoryStore<'a> {
    tx: &'a MemoryTransaction,
    name: String,
}

impl<'a> Store<'a> for MemoryStore<'a> {
    fn get(&self, key: &[u8]) -> EngineResult<Vec<u8>> {
        self.tx
            .read_store(&self.name, |store| store.entries.get(key).cloned())?
            .ok_or(EngineError::KeyNotFound)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        self.tx.write_store(&self.name, |store| {
            Arc::make_mut(&mut store.entries).insert(key.to_vec(), value.to_vec());
            Ok(())
        })
    }

    fn delete(&self, key: &[u8]) -> EngineResult<()> {
        self.tx.write_store(&self.name, |store| {
            if !store.entries.contains_key(key) {
                return Err(EngineError::KeyNotFound);
            }
            Arc::make_mut(&mut store.entries).remove(key);
            Ok(())
        })
    }

    fn iterator(&self, options: IteratorOptions) -> EngineResult<Box<dyn Cursor + 'a>> {
        let entries = self
            .tx
            .read_store(&self.name, |store| Arc::clone(&store.entries))?;
        let (lower, upper) = options.effective_bounds();
        Ok(Box::new(MemoryCursor {
            entries,
            lower,
            upper,
            reverse: options.reverse,
            closed: false,
        }))
    }

    fn next_sequence(&self) -> EngineResult<u64> {
        self.tx.write_store(&self.name, |store| {
            store.sequence += 1;
            Ok(store.sequence)
        })
    }
}

/// Walks a frozen copy of the store, narrowing its bounds past each
/// returned key.
struct MemoryCursor {
    entries: Arc<Entries>,
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
    reverse: bool,
    closed: bool,
}

fn as_slice(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

impl Cursor for MemoryCursor {
    fn next(&mut self) -> EngineResult<Option<(Vec<u8>, Vec<u8>)>> {
        if self.closed || !is_satisfiable(&self.lower, &self.upper) {
            return Ok(None);
        }

        let mut range = self
            .entries
            .range::<[u8], _>((as_slice(&self.lower), as_slice(&self.upper)));
        let item = if self.reverse {
            range.next_back()
        } else {
            range.next()
        };
        let Some((key, value)) = item.map(|(k, v)| (k.clone(), v.clone())) else {
            self.close();
            return Ok(None);
        };

        if self.reverse {
            self.upper = Bound::Excluded(key.clone());
        } else {
            self.lower = Bound::Excluded(key.clone());
        }
        Ok(Some((key, value)))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
