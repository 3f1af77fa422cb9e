//! Table and index metadata
//!
//! Metadata lives in a dedicated store inside the same engine, one JSON
//! entry per table keyed by the encoded table name. It is created on the
//! first DDL statement, so a fresh database has no catalog store at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{decode_value, encode_value};
use crate::document::{FieldPath, Value};
use crate::engine::{EngineError, IteratorOptions, Store, Transaction};

use super::errors::{TableError, TableResult};
use super::table::Table;

/// Name of the store holding catalog entries
pub const CATALOG_STORE: &str = "__tessera_catalog";

/// Metadata for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    /// Engine store holding the documents
    pub store: String,
    /// Field holding the primary key; surrogate keys when absent
    #[serde(default)]
    pub primary_key: Option<FieldPath>,
    #[serde(default)]
    pub indexes: Vec<IndexInfo>,
}

impl TableInfo {
    pub fn index(&self, name: &str) -> Option<&IndexInfo> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Indexes covering `path`, in name order
    pub fn indexes_on(&self, path: &FieldPath) -> Vec<&IndexInfo> {
        let mut found: Vec<&IndexInfo> = self.indexes.iter().filter(|i| i.path == *path).collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    pub fn is_primary_key(&self, path: &FieldPath) -> bool {
        self.primary_key.as_ref() == Some(path)
    }
}

/// Metadata for one secondary index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub path: FieldPath,
    pub store: String,
}

/// Options accepted by [`Catalog::create_table`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub primary_key: Option<FieldPath>,
    /// Return the existing table instead of failing when the name is taken
    pub if_not_exists: bool,
}

impl TableOptions {
    pub fn with_primary_key(path: FieldPath) -> Self {
        Self {
            primary_key: Some(path),
            ..Self::default()
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

/// Catalog operations within one transaction
pub struct Catalog<'a> {
    tx: &'a dyn Transaction,
}

impl<'a> Catalog<'a> {
    pub fn new(tx: &'a dyn Transaction) -> Self {
        Self { tx }
    }

    pub fn table_info(&self, name: &str) -> TableResult<TableInfo> {
        let Some(store) = self.open_store()? else {
            return Err(TableError::TableNotFound(name.to_string()));
        };
        match store.get(&entry_key(name)?) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(EngineError::KeyNotFound) => Err(TableError::TableNotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Every table, in name order
    pub fn list_tables(&self) -> TableResult<Vec<TableInfo>> {
        let Some(store) = self.open_store()? else {
            return Ok(Vec::new());
        };
        let mut cursor = store.iterator(IteratorOptions::default())?;
        let mut tables = Vec::new();
        while let Some((_, bytes)) = cursor.next()? {
            tables.push(serde_json::from_slice(&bytes)?);
        }
        cursor.close();
        Ok(tables)
    }

    /// Table names, in name order
    pub fn table_names(&self) -> TableResult<Vec<String>> {
        let Some(store) = self.open_store()? else {
            return Ok(Vec::new());
        };
        let mut cursor = store.iterator(IteratorOptions::default())?;
        let mut names = Vec::new();
        while let Some((key, _)) = cursor.next()? {
            if let Value::Text(name) = decode_value(&key)? {
                names.push(name);
            }
        }
        cursor.close();
        Ok(names)
    }

    pub fn create_table(&self, name: &str, options: TableOptions) -> TableResult<TableInfo> {
        let store = self.writable_store()?;
        let key = entry_key(name)?;
        match store.get(&key) {
            Ok(bytes) if options.if_not_exists => return Ok(serde_json::from_slice(&bytes)?),
            Ok(_) => return Err(TableError::TableExists(name.to_string())),
            Err(EngineError::KeyNotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let info = TableInfo {
            name: name.to_string(),
            store: table_store_name(name),
            primary_key: options.primary_key,
            indexes: Vec::new(),
        };
        self.tx.create_store(&info.store)?;
        store.put(&key, &serde_json::to_vec(&info)?)?;
        debug!(table = name, "table created");
        Ok(info)
    }

    /// Drops a table together with its indexes
    pub fn drop_table(&self, name: &str) -> TableResult<()> {
        let info = self.table_info(name)?;
        for index in &info.indexes {
            self.tx.drop_store(&index.store)?;
        }
        self.tx.drop_store(&info.store)?;
        self.writable_store()?.delete(&entry_key(name)?)?;
        debug!(table = name, "table dropped");
        Ok(())
    }

    /// Creates an index and fills it from the table's current documents
    pub fn create_index(&self, table: &str, index: &str, path: FieldPath) -> TableResult<IndexInfo> {
        let mut info = self.table_info(table)?;
        if info.index(index).is_some() {
            return Err(TableError::IndexExists {
                table: table.to_string(),
                index: index.to_string(),
            });
        }

        let index_info = IndexInfo {
            name: index.to_string(),
            path,
            store: index_store_name(table, index),
        };
        self.tx.create_store(&index_info.store)?;
        let indexed = Table::open(self.tx, info.clone())?.backfill_index(&index_info)?;

        info.indexes.push(index_info.clone());
        self.save(&info)?;
        debug!(table, index, indexed, "index created");
        Ok(index_info)
    }

    pub fn drop_index(&self, table: &str, index: &str) -> TableResult<()> {
        let mut info = self.table_info(table)?;
        let Some(pos) = info.indexes.iter().position(|i| i.name == index) else {
            return Err(TableError::IndexNotFound {
                table: table.to_string(),
                index: index.to_string(),
            });
        };
        let removed = info.indexes.remove(pos);
        self.tx.drop_store(&removed.store)?;
        self.save(&info)?;
        debug!(table, index, "index dropped");
        Ok(())
    }

    /// Opens a table for reading and writing in this transaction
    pub fn table(&self, name: &str) -> TableResult<Table<'a>> {
        Table::open(self.tx, self.table_info(name)?)
    }

    /// Copies the metadata of every table for planning
    pub fn snapshot(&self) -> TableResult<CatalogSnapshot> {
        Ok(CatalogSnapshot::from_tables(self.list_tables()?))
    }

    fn save(&self, info: &TableInfo) -> TableResult<()> {
        self.writable_store()?
            .put(&entry_key(&info.name)?, &serde_json::to_vec(info)?)?;
        Ok(())
    }

    fn open_store(&self) -> TableResult<Option<Box<dyn Store<'a> + 'a>>> {
        match self.tx.get_store(CATALOG_STORE) {
            Ok(store) => Ok(Some(store)),
            Err(EngineError::StoreNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn writable_store(&self) -> TableResult<Box<dyn Store<'a> + 'a>> {
        if let Some(store) = self.open_store()? {
            return Ok(store);
        }
        self.tx.create_store(CATALOG_STORE)?;
        Ok(self.tx.get_store(CATALOG_STORE)?)
    }
}

fn entry_key(name: &str) -> TableResult<Vec<u8>> {
    Ok(encode_value(&Value::Text(name.to_string()))?)
}

/// Escapes the store name separator, so distinct names never share a store
fn escape_store_part(part: &str) -> String {
    part.replace('%', "%25").replace(':', "%3A")
}

fn table_store_name(table: &str) -> String {
    format!("t:{}", escape_store_part(table))
}

fn index_store_name(table: &str, index: &str) -> String {
    format!("i:{}:{}", escape_store_part(table), escape_store_part(index))
}

/// Point-in-time copy of the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    tables: BTreeMap<String, TableInfo>,
}

impl CatalogSnapshot {
    pub fn from_tables(tables: impl IntoIterator<Item = TableInfo>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TableInfo> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, MemoryEngine};
    use crate::errors::ErrorKind;

    #[test]
    fn test_create_and_list_tables() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(tx.as_ref());
        assert!(catalog.list_tables().unwrap().is_empty());

        catalog.create_table("b", TableOptions::default()).unwrap();
        catalog
            .create_table("a", TableOptions::with_primary_key(FieldPath::field("id")))
            .unwrap();
        assert_eq!(catalog.table_names().unwrap(), vec!["a", "b"]);
        assert!(matches!(
            catalog.create_table("a", TableOptions::default()),
            Err(TableError::TableExists(_))
        ));

        let info = catalog.table_info("a").unwrap();
        assert_eq!(info.store, "t:a");
        assert_eq!(info.primary_key, Some(FieldPath::field("id")));
    }

    #[test]
    fn test_create_table_if_not_exists() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(tx.as_ref());
        let created = catalog
            .create_table("a", TableOptions::with_primary_key(FieldPath::field("id")))
            .unwrap();

        // existing metadata wins over the new options
        let again = catalog
            .create_table("a", TableOptions::default().if_not_exists())
            .unwrap();
        assert_eq!(again, created);
        assert_eq!(catalog.table_names().unwrap(), vec!["a"]);

        let fresh = catalog
            .create_table("b", TableOptions::default().if_not_exists())
            .unwrap();
        assert_eq!(fresh.store, "t:b");
    }

    #[test]
    fn test_store_names_do_not_collide() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(tx.as_ref());
        catalog.create_table("x", TableOptions::default()).unwrap();
        catalog.create_table("x:y", TableOptions::default()).unwrap();
        catalog.create_table("x%3Ay", TableOptions::default()).unwrap();

        let first = catalog.create_index("x", "y:z", FieldPath::field("a")).unwrap();
        let second = catalog.create_index("x:y", "z", FieldPath::field("b")).unwrap();
        assert_ne!(first.store, second.store);

        let stores: Vec<String> = ["x", "x:y", "x%3Ay"]
            .iter()
            .map(|t| catalog.table_info(t).unwrap().store)
            .collect();
        assert_eq!(stores, vec!["t:x", "t:x%3Ay", "t:x%253Ay"]);

        catalog.drop_table("x").unwrap();
        assert!(catalog.table_info("x:y").unwrap().index("z").is_some());
    }

    #[test]
    fn test_catalog_survives_commit() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        Catalog::new(tx.as_ref())
            .create_table("t", TableOptions::default())
            .unwrap();
        tx.commit().unwrap();

        let tx = engine.begin(false).unwrap();
        let snapshot = Catalog::new(tx.as_ref()).snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("t").is_some());
    }

    #[test]
    fn test_drop_table_removes_stores() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(tx.as_ref());
        catalog.create_table("t", TableOptions::default()).unwrap();
        catalog.create_index("t", "by_x", FieldPath::field("x")).unwrap();
        catalog.drop_table("t").unwrap();

        assert_eq!(tx.list_stores().unwrap(), vec![CATALOG_STORE.to_string()]);
        assert!(catalog.table_info("t").unwrap_err().is_not_found());
    }

    #[test]
    fn test_index_lifecycle() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(tx.as_ref());
        catalog.create_table("t", TableOptions::default()).unwrap();
        catalog.create_index("t", "by_x", FieldPath::field("x")).unwrap();
        assert!(matches!(
            catalog.create_index("t", "by_x", FieldPath::field("y")),
            Err(TableError::IndexExists { .. })
        ));

        let info = catalog.table_info("t").unwrap();
        assert_eq!(info.indexes_on(&FieldPath::field("x")).len(), 1);

        catalog.drop_index("t", "by_x").unwrap();
        assert!(catalog.table_info("t").unwrap().indexes.is_empty());
        assert!(catalog.drop_index("t", "by_x").is_err());
    }

    #[test]
    fn test_ddl_in_read_only_transaction() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(false).unwrap();
        let err = Catalog::new(tx.as_ref())
            .create_table("t", TableOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
    }

    #[test]
    fn test_index_backfill() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(tx.as_ref());
        catalog.create_table("t", TableOptions::default()).unwrap();
        let table = catalog.table("t").unwrap();
        table.insert(&crate::document::Document::new().with("x", 5)).unwrap();
        table.insert(&crate::document::Document::new().with("x", 3)).unwrap();

        catalog.create_index("t", "by_x", FieldPath::field("x")).unwrap();
        let table = catalog.table("t").unwrap();
        let range = crate::table::KeyRange::all();
        let xs: Vec<Value> = table
            .scan_index("by_x", &range, false)
            .unwrap()
            .map(|row| row.unwrap().1.get("x").cloned().unwrap())
            .collect();
        assert_eq!(xs, vec![Value::Int(3), Value::Int(5)]);
    }
}
