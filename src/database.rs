//! Database handle and transactions
//!
//! `Database` wraps an engine together with its configuration. All reads
//! and writes happen inside a [`Tx`]; `update` and `view` run a closure in a
//! managed transaction, committing on success and rolling back on error.

use tracing::{debug, warn};

use crate::config::{DatabaseConfig, EngineKind};
use crate::document::{Document, FieldPath, Value};
use crate::engine::{Engine, MemoryEngine, Transaction};
use crate::errors::Result;
use crate::executor::{ExecutionResult, QueryExecutor, Rows};
use crate::observability::{log_event, log_event_with_fields, Event, ObservationScope};
use crate::planner::{ExplainPlan, QueryPlan, QueryPlanner, Statement};
use crate::table::{Catalog, IndexInfo, Table, TableInfo, TableOptions};

/// An open database over a storage engine
pub struct Database<E: Engine = Box<dyn Engine>> {
    engine: E,
    config: DatabaseConfig,
}

impl Database<Box<dyn Engine>> {
    /// Opens a database on the engine named by `config`
    pub fn open(config: DatabaseConfig) -> Self {
        let engine: Box<dyn Engine> = match config.engine {
            EngineKind::Memory => Box::new(MemoryEngine::new()),
        };
        Self::with_config(engine, config)
    }
}

impl<E: Engine> Database<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, DatabaseConfig::default())
    }

    pub fn with_config(engine: E, config: DatabaseConfig) -> Self {
        log_event_with_fields(Event::DatabaseOpened, &[("engine", config.engine.as_str())]);
        Self { engine, config }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Starts a transaction. The engine may refuse a second writer.
    pub fn begin(&self, writable: bool) -> Result<Tx<'_>> {
        let inner = self.engine.begin(writable)?;
        log_event_with_fields(
            Event::TxBegin,
            &[("writable", if writable { "true" } else { "false" })],
        );
        Ok(Tx {
            inner,
            config: &self.config,
        })
    }

    /// Runs `f` in a read-write transaction.
    ///
    /// Commits when `f` succeeds, rolls back when it fails.
    pub fn update<T>(&self, f: impl FnOnce(&Tx<'_>) -> Result<T>) -> Result<T> {
        let tx = self.begin(true)?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(error = %rollback, "rollback after failed update");
                }
                Err(err)
            }
        }
    }

    /// Runs `f` in a read-only transaction
    pub fn view<T>(&self, f: impl FnOnce(&Tx<'_>) -> Result<T>) -> Result<T> {
        let tx = self.begin(false)?;
        let result = f(&tx);
        tx.rollback()?;
        result
    }
}

/// A transaction on a [`Database`].
///
/// Dropping it without calling `commit` discards its writes.
pub struct Tx<'db> {
    inner: Box<dyn Transaction>,
    config: &'db DatabaseConfig,
}

impl<'db> Tx<'db> {
    pub fn is_writable(&self) -> bool {
        self.inner.is_writable()
    }

    /// Raw engine transaction
    pub fn raw(&self) -> &dyn Transaction {
        self.inner.as_ref()
    }

    fn catalog(&self) -> Catalog<'_> {
        Catalog::new(self.raw())
    }

    pub fn create_table(&self, name: &str, options: TableOptions) -> Result<TableInfo> {
        let info = self.catalog().create_table(name, options)?;
        log_event_with_fields(Event::TableCreated, &[("table", name)]);
        Ok(info)
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.catalog().drop_table(name)?;
        log_event_with_fields(Event::TableDropped, &[("table", name)]);
        Ok(())
    }

    /// Creates an index on `path` and fills it from the existing documents
    pub fn create_index(&self, table: &str, index: &str, path: FieldPath) -> Result<IndexInfo> {
        let info = self.catalog().create_index(table, index, path)?;
        log_event_with_fields(Event::IndexCreated, &[("table", table), ("index", index)]);
        Ok(info)
    }

    pub fn drop_index(&self, table: &str, index: &str) -> Result<()> {
        self.catalog().drop_index(table, index)?;
        log_event_with_fields(Event::IndexDropped, &[("table", table), ("index", index)]);
        Ok(())
    }

    pub fn list_tables(&self) -> Result<Vec<TableInfo>> {
        Ok(self.catalog().list_tables()?)
    }

    pub fn table(&self, name: &str) -> Result<Table<'_>> {
        Ok(self.catalog().table(name)?)
    }

    /// Inserts a document, returning its primary key
    pub fn insert(&self, table: &str, doc: &Document) -> Result<Value> {
        Ok(self.table(table)?.insert(doc)?)
    }

    /// Plans a statement against this transaction's catalog
    pub fn plan(&self, statement: &Statement, params: &[Value]) -> Result<QueryPlan> {
        let snapshot = self.catalog().snapshot()?;
        match QueryPlanner::new(&snapshot).plan(statement, params) {
            Ok(plan) => {
                log_event(Event::QueryPlanned);
                if self.config.log_plans {
                    debug!(plan = %ExplainPlan::from_plan(&plan), "query plan");
                }
                Ok(plan)
            }
            Err(err) => {
                log_event_with_fields(
                    Event::QueryRejected,
                    &[("code", err.code().code()), ("reason", err.message())],
                );
                Err(err.into())
            }
        }
    }

    /// Opens a lazy result stream. The stream borrows the transaction.
    pub fn query(&self, statement: &Statement, params: &[Value]) -> Result<Rows<'_>> {
        let plan = self.plan(statement, params)?;
        Ok(self.executor().open(&plan)?)
    }

    /// Plans and runs a statement, collecting every result
    pub fn execute(&self, statement: &Statement, params: &[Value]) -> Result<ExecutionResult> {
        let scope = ObservationScope::new("QUERY");
        let plan = match self.plan(statement, params) {
            Ok(plan) => plan,
            Err(err) => {
                scope.fail(&err.to_string());
                return Err(err);
            }
        };

        match self.executor().execute(&plan, None) {
            Ok(result) => {
                let returned = result.returned_count.to_string();
                let scanned = result.scanned_count.to_string();
                scope.complete_with_fields(&[
                    ("returned", returned.as_str()),
                    ("scanned", scanned.as_str()),
                ]);
                Ok(result)
            }
            Err(err) => {
                let reason = err.to_string();
                if err.is_corruption() {
                    log_event_with_fields(Event::DataCorruption, &[("error", reason.as_str())]);
                } else {
                    log_event_with_fields(Event::QueryFailed, &[("code", err.code())]);
                }
                scope.fail(&reason);
                Err(err.into())
            }
        }
    }

    /// Explains a statement. Planner rejections are part of the output.
    pub fn explain(&self, statement: &Statement, params: &[Value]) -> Result<ExplainPlan> {
        log_event(Event::ExplainBegin);
        let snapshot = self.catalog().snapshot()?;
        let explain = match QueryPlanner::new(&snapshot).plan(statement, params) {
            Ok(plan) => ExplainPlan::from_plan(&plan),
            Err(err) => ExplainPlan::from_error(&err),
        };
        log_event_with_fields(
            Event::ExplainComplete,
            &[("accepted", if explain.accepted { "true" } else { "false" })],
        );
        Ok(explain)
    }

    fn executor(&self) -> QueryExecutor<'_> {
        QueryExecutor::new(self.raw()).with_hasher(self.config.distinct_hasher)
    }

    pub fn commit(self) -> Result<()> {
        self.inner.commit()?;
        log_event(Event::TxCommit);
        Ok(())
    }

    pub fn rollback(self) -> Result<()> {
        self.inner.rollback()?;
        log_event(Event::TxRollback);
        Ok(())
    }
}
