//! Tables over the storage engine
//!
//! A table owns one store. Keys are the canonical encoding of the primary
//! key, values are checksummed document records. Each index owns a store of
//! its own whose keys are `encode(field value) ++ encode(primary key)` and
//! whose values are `encode(primary key)`.

use tracing::trace;

use crate::codec::{decode_value, encode_value, ValueEncoder};
use crate::document::{Document, Value};
use crate::engine::{Cursor, EngineError, Store, Transaction};

use super::catalog::{IndexInfo, TableInfo};
use super::errors::{TableError, TableResult};
use super::range::KeyRange;
use super::record::{decode_record, encode_record};

/// A table bound to a transaction
pub struct Table<'a> {
    info: TableInfo,
    tx: &'a dyn Transaction,
    store: Box<dyn Store<'a> + 'a>,
}

impl<'a> Table<'a> {
    pub fn open(tx: &'a dyn Transaction, info: TableInfo) -> TableResult<Self> {
        let store = tx.get_store(&info.store)?;
        Ok(Self { info, tx, store })
    }

    pub fn info(&self) -> &TableInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Inserts a document and returns its primary key.
    ///
    /// Tables with a declared primary key read it from the document; others
    /// assign the next surrogate integer.
    pub fn insert(&self, doc: &Document) -> TableResult<Value> {
        let pk = match &self.info.primary_key {
            Some(path) => {
                let pk = match doc.get_path(path) {
                    Some(v) if !v.is_null() => v.clone(),
                    _ => {
                        return Err(TableError::MissingPrimaryKey {
                            table: self.info.name.clone(),
                            field: path.to_string(),
                        })
                    }
                };
                if self.contains(&pk)? {
                    return Err(TableError::DuplicatePrimaryKey {
                        table: self.info.name.clone(),
                        key: pk.to_string(),
                    });
                }
                pk
            }
            None => Value::Int(self.surrogate_key()?),
        };

        self.store.put(&encode_value(&pk)?, &encode_record(doc)?)?;
        self.add_to_indexes(&pk, doc)?;
        trace!(table = %self.info.name, key = %pk, "document inserted");
        Ok(pk)
    }

    /// Fetches a document by primary key
    pub fn get(&self, key: &Value) -> TableResult<Document> {
        match self.store.get(&encode_value(key)?) {
            Ok(bytes) => self.read_record(&bytes),
            Err(EngineError::KeyNotFound) => Err(self.not_found(key)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn contains(&self, key: &Value) -> TableResult<bool> {
        match self.store.get(&encode_value(key)?) {
            Ok(_) => Ok(true),
            Err(EngineError::KeyNotFound) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete(&self, key: &Value) -> TableResult<()> {
        let existing = self.get(key)?;
        self.store.delete(&encode_value(key)?)?;
        self.remove_from_indexes(key, &existing)?;
        trace!(table = %self.info.name, key = %key, "document deleted");
        Ok(())
    }

    /// Overwrites the document stored under `key`
    pub fn replace(&self, key: &Value, doc: &Document) -> TableResult<()> {
        let existing = self.get(key)?;
        if let Some(path) = &self.info.primary_key {
            if doc.get_path(path) != Some(key) {
                return Err(TableError::PrimaryKeyChanged {
                    table: self.info.name.clone(),
                });
            }
        }

        self.remove_from_indexes(key, &existing)?;
        self.store.put(&encode_value(key)?, &encode_record(doc)?)?;
        self.add_to_indexes(key, doc)?;
        Ok(())
    }

    /// Lazily walks documents whose primary key falls in `range`
    pub fn iterate(&self, range: &KeyRange, reverse: bool) -> TableResult<TableIter<'a>> {
        let cursor = self.store.iterator(range.to_options(reverse))?;
        Ok(TableIter {
            table: self.info.name.clone(),
            cursor,
        })
    }

    /// Lazily walks documents through an index, in index order
    pub fn scan_index(
        &self,
        index: &str,
        range: &KeyRange,
        reverse: bool,
    ) -> TableResult<IndexIter<'a>> {
        let info = self.index(index)?;
        let cursor = self
            .tx
            .get_store(&info.store)?
            .iterator(range.to_options(reverse))?;
        Ok(IndexIter {
            table: self.info.name.clone(),
            cursor,
            records: self.tx.get_store(&self.info.store)?,
        })
    }

    /// Adds entries for every stored document to a freshly created index
    pub(crate) fn backfill_index(&self, index: &IndexInfo) -> TableResult<usize> {
        let store = self.tx.get_store(&index.store)?;
        let mut rows = self.iterate(&KeyRange::all(), false)?;
        let mut count = 0;
        for row in rows.by_ref() {
            let (pk, doc) = row?;
            let (key, value) = index_entry(index, &pk, &doc)?;
            store.put(&key, &value)?;
            count += 1;
        }
        rows.close();
        Ok(count)
    }

    fn index(&self, name: &str) -> TableResult<&IndexInfo> {
        self.info
            .index(name)
            .ok_or_else(|| TableError::IndexNotFound {
                table: self.info.name.clone(),
                index: name.to_string(),
            })
    }

    fn surrogate_key(&self) -> TableResult<i64> {
        let seq = self.store.next_sequence()?;
        i64::try_from(seq).map_err(|_| {
            TableError::Engine(EngineError::Backend(format!(
                "sequence of table {} overflowed",
                self.info.name
            )))
        })
    }

    fn add_to_indexes(&self, pk: &Value, doc: &Document) -> TableResult<()> {
        for index in &self.info.indexes {
            let (key, value) = index_entry(index, pk, doc)?;
            self.tx.get_store(&index.store)?.put(&key, &value)?;
        }
        Ok(())
    }

    fn remove_from_indexes(&self, pk: &Value, doc: &Document) -> TableResult<()> {
        for index in &self.info.indexes {
            let (key, _) = index_entry(index, pk, doc)?;
            match self.tx.get_store(&index.store)?.delete(&key) {
                Ok(()) | Err(EngineError::KeyNotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_record(&self, bytes: &[u8]) -> TableResult<Document> {
        read_record(&self.info.name, bytes)
    }

    fn not_found(&self, key: &Value) -> TableError {
        TableError::DocumentNotFound {
            table: self.info.name.clone(),
            key: key.to_string(),
        }
    }
}

/// Documents missing the indexed field are indexed under Null
fn index_entry(index: &IndexInfo, pk: &Value, doc: &Document) -> TableResult<(Vec<u8>, Vec<u8>)> {
    let value = doc.get_path(&index.path).unwrap_or(&Value::Null);
    let mut encoder = ValueEncoder::new(Vec::new());
    encoder.encode(value)?;
    encoder.encode(pk)?;
    Ok((encoder.into_inner(), encode_value(pk)?))
}

fn read_record(table: &str, bytes: &[u8]) -> TableResult<Document> {
    decode_record(bytes).map_err(|e| TableError::Corruption {
        table: table.to_string(),
        reason: e.to_string(),
    })
}

/// Primary-key ordered documents of a table
pub struct TableIter<'a> {
    table: String,
    cursor: Box<dyn Cursor + 'a>,
}

impl TableIter<'_> {
    /// Releases the underlying cursor. Idempotent.
    pub fn close(&mut self) {
        self.cursor.close();
    }
}

impl Iterator for TableIter<'_> {
    type Item = TableResult<(Value, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.next() {
            Ok(Some((key, bytes))) => Some(
                decode_value(&key)
                    .map_err(TableError::from)
                    .and_then(|pk| Ok((pk, read_record(&self.table, &bytes)?))),
            ),
            Ok(None) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

impl Drop for TableIter<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Documents of a table in the order of one of its indexes
pub struct IndexIter<'a> {
    table: String,
    cursor: Box<dyn Cursor + 'a>,
    records: Box<dyn Store<'a> + 'a>,
}

impl IndexIter<'_> {
    /// Releases the underlying cursor. Idempotent.
    pub fn close(&mut self) {
        self.cursor.close();
    }

    fn fetch(&self, pk_bytes: &[u8]) -> TableResult<(Value, Document)> {
        let pk = decode_value(pk_bytes)?;
        match self.records.get(pk_bytes) {
            Ok(bytes) => Ok((pk, read_record(&self.table, &bytes)?)),
            Err(EngineError::KeyNotFound) => Err(TableError::Corruption {
                table: self.table.clone(),
                reason: format!("index entry points at missing document {}", pk),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

impl Iterator for IndexIter<'_> {
    type Item = TableResult<(Value, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.next() {
            Ok(Some((_, pk_bytes))) => Some(self.fetch(&pk_bytes)),
            Ok(None) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

impl Drop for IndexIter<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
