//! The temporal store: snapshot reads and atomic write application
//!
//! Reads go through the engine's rewriter, so a fragment referencing
//! `table$` sees the snapshot selected by the caller's context. Writes
//! execute a planned statement sequence inside one transaction and
//! verify snapshot uniqueness before committing. Cancellation follows
//! the usual async rule: dropping a pending call aborts the transaction
//! and nothing partial becomes observable.

use serde::Serialize;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::Row;
use std::sync::Arc;
use tracing::debug;

use temporal_engine::{bind_positional, Engine, QueryFragment, UpdateRequest, Value};
use temporal_kernel::{Instant, TemporalContext};

use crate::error::StoreError;
use crate::pool::{connect, StoreConfig};
use crate::row::RecordSpan;

/// Row counts and the stamp of one applied write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    /// Rows whose transaction period was closed.
    pub superseded: u64,
    /// Valid-time fragments re-emitted outside (or, when preserving,
    /// inside) the window.
    pub preserved: u64,
    /// New facts inserted (0 in preserving mode, 1 otherwise).
    pub inserted: u64,
    /// The system instant stamped on every statement of the write.
    pub txn_moment: Instant,
}

/// A SQLite-backed bitemporal store sharing one engine instance.
#[derive(Debug, Clone)]
pub struct TemporalStore {
    pool: SqlitePool,
    engine: Arc<Engine>,
}

impl TemporalStore {
    pub fn new(pool: SqlitePool, engine: Arc<Engine>) -> Self {
        Self { pool, engine }
    }

    /// Opens a pool for `config` and wraps it with the engine.
    pub async fn connect(config: &StoreConfig, engine: Arc<Engine>) -> Result<Self, StoreError> {
        let pool = connect(config).await?;
        Ok(Self::new(pool, engine))
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs a snapshot-restricted read at the given temporal context.
    pub async fn query_rows(
        &self,
        context: &TemporalContext,
        fragment: QueryFragment,
    ) -> Result<Vec<SqliteRow>, StoreError> {
        let rewritten = self.engine.snapshot_query(context, fragment)?;
        let (sql, values) = bind_positional(&rewritten)?;
        if self.engine.config().dump_queries {
            dump_statement("query_rows", &sql, &values);
        }
        bind_values(&sql, &values)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::backend("query_rows", e))
    }

    /// Like [`Self::query_rows`] but returns at most one row.
    pub async fn query_row(
        &self,
        context: &TemporalContext,
        fragment: QueryFragment,
    ) -> Result<Option<SqliteRow>, StoreError> {
        let rewritten = self.engine.snapshot_query(context, fragment)?;
        let (sql, values) = bind_positional(&rewritten)?;
        if self.engine.config().dump_queries {
            dump_statement("query_row", &sql, &values);
        }
        bind_values(&sql, &values)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::backend("query_row", e))
    }

    /// Runs raw, possibly multi-statement SQL. Used for schema setup and
    /// data seeding; bypasses the rewriter entirely.
    pub async fn execute_raw(&self, sql: &str) -> Result<(), StoreError> {
        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend("execute_raw", e))?;
        Ok(())
    }

    /// Applies a window update atomically.
    ///
    /// Plans the statement sequence, runs it inside one transaction, and
    /// verifies the snapshot-uniqueness post-condition. A guard failure
    /// rolls everything back and surfaces the offending key and window.
    pub async fn apply(&self, request: &UpdateRequest) -> Result<WriteOutcome, StoreError> {
        let plan = self.engine.plan_update(request)?;
        let dump = self.engine.config().dump_queries;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::backend("begin transaction", e))?;

        if dump {
            let (sql, values) = bind_positional(&plan.pre_image)?;
            dump_statement("pre-image", &sql, &values);
            let rows = bind_values(&sql, &values)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| StoreError::backend("pre-image", e))?;
            for row in &rows {
                if let Ok(span) = RecordSpan::from_row(row) {
                    debug!(valid = %span.valid, txn = %span.txn, "pre-image row");
                }
            }
        }

        let superseded = execute_statement(&mut tx, &plan.supersede, dump, "supersede").await?;
        let preserved = execute_statement(&mut tx, &plan.reemit, dump, "preserve fragments").await?;
        let inserted = match &plan.insert {
            Some(fragment) => execute_statement(&mut tx, fragment, dump, "insert fact").await?,
            None => 0,
        };

        let (sql, values) = bind_positional(&plan.guard)?;
        let guard_row = bind_values(&sql, &values)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| StoreError::backend("consistency guard", e))?;
        let conflicts: i64 = guard_row
            .try_get(0)
            .map_err(|e| StoreError::backend("consistency guard", e))?;
        if conflicts > 0 {
            tx.rollback()
                .await
                .map_err(|e| StoreError::backend("rollback", e))?;
            return Err(StoreError::Consistency {
                table: plan.table,
                key: plan.key,
                window: plan.window.to_string(),
                conflicts,
            });
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::backend("commit", e))?;

        debug!(
            table = %plan.table,
            key = %plan.key,
            window = %plan.window,
            superseded,
            preserved,
            inserted,
            "window update applied"
        );
        Ok(WriteOutcome {
            superseded,
            preserved,
            inserted,
            txn_moment: plan.txn_moment,
        })
    }
}

async fn execute_statement(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    fragment: &QueryFragment,
    dump: bool,
    operation: &str,
) -> Result<u64, StoreError> {
    let (sql, values) = bind_positional(fragment)?;
    if dump {
        dump_statement(operation, &sql, &values);
    }
    let done = bind_values(&sql, &values)
        .execute(&mut **tx)
        .await
        .map_err(|e| StoreError::backend(operation, e))?;
    Ok(done.rows_affected())
}

fn bind_values<'q>(
    sql: &'q str,
    values: &'q [Value],
) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
    let mut query = sqlx::query(sql);
    for value in values {
        query = match value {
            Value::Null => query.bind(Option::<String>::None),
            Value::Integer(v) => query.bind(*v),
            Value::Real(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Instant(v) => query.bind(temporal_kernel::format_instant(v)),
        };
    }
    query
}

fn dump_statement(operation: &str, sql: &str, values: &[Value]) {
    let params = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    debug!(operation, sql, params = %params, "statement");
}
