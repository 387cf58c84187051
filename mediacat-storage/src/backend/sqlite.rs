//! SQLite backend: every JSON payload is stored as text in a plain column and
//! has to be parsed after the fetch.

use std::path::Path;
use std::sync::{Arc, Mutex};

use mediacat_types::MediaKind;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ensure_live, row_count, RawBatch, RecentBackend, RecentStatements};
use crate::config::StorageEngine;
use crate::error::{StorageError, StorageResult};
use crate::predicate::{column_ref, SqlDialect};
use crate::request::RecentRequest;
use crate::row::{self, RawRow, RawValue};

/// `json_extract` paths guarded by `json_valid`.
///
/// SQLite raises an error for `json_extract` on malformed text, which would
/// fail the whole statement; the guard turns a corrupt document into NULL so
/// only that row falls out. The count is compared numerically because a
/// stored integer 0 is never equal to the text `'0'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    fn latest_path(kind: MediaKind, key: &str) -> String {
        let column = column_ref(kind, kind.progress_column());
        format!(
            "(CASE WHEN json_valid({column}) THEN json_extract({column}, '$.latest.{key}') END)"
        )
    }
}

impl SqlDialect for SqliteDialect {
    fn latest_count_positive(&self, kind: MediaKind) -> String {
        format!(
            "CAST({} AS REAL) > 0",
            Self::latest_path(kind, kind.latest_count_key())
        )
    }

    fn latest_updated_at_desc(&self, kind: MediaKind) -> String {
        format!(
            "CAST({} AS REAL) DESC NULLS LAST",
            Self::latest_path(kind, "updatedAt")
        )
    }
}

/// Recent listing over a SQLite catalog.
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Opens the catalog database at `path`.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::open_with_conn(Arc::new(Mutex::new(conn))))
    }

    /// Opens an empty in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::open_with_conn(Arc::new(Mutex::new(conn))))
    }

    /// Wraps a connection shared with other components.
    pub fn open_with_conn(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Arc<Mutex<Connection>> {
        &self.conn
    }
}

impl RecentBackend for SqliteBackend {
    fn engine(&self) -> StorageEngine {
        StorageEngine::Sqlite
    }

    fn fetch_batch(
        &self,
        request: &RecentRequest,
        cancel: &CancellationToken,
    ) -> StorageResult<RawBatch> {
        let statements = RecentStatements::build(&SqliteDialect, request);
        let columns = row::columns(request.kind());
        debug!("sqlite recent page: {}", statements.page);

        ensure_live(cancel)?;
        let mut conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let tx = conn.transaction()?;

        let total: i64 = tx.query_row(
            &statements.count,
            params_from_iter(statements.params.iter()),
            |row| row.get(0),
        )?;
        ensure_live(cancel)?;

        let mut rows = Vec::new();
        {
            let mut stmt = tx.prepare(&statements.page)?;
            let mut result = stmt.query(params_from_iter(statements.params.iter()))?;
            while let Some(result_row) = result.next()? {
                ensure_live(cancel)?;
                let mut raw = RawRow::new();
                for (idx, column) in columns.iter().enumerate() {
                    let value: Value = result_row.get(idx)?;
                    raw.insert(*column, raw_value(value));
                }
                rows.push(raw);
            }
        }
        tx.commit()?;

        debug!("sqlite fetched {} of {} {} rows", rows.len(), total, request.kind());
        Ok(RawBatch {
            total: row_count(total),
            rows,
        })
    }
}

fn raw_value(value: Value) -> RawValue {
    match value {
        Value::Null => RawValue::Null,
        Value::Integer(i) => RawValue::Integer(i),
        Value::Real(f) => RawValue::Real(f),
        Value::Text(s) => RawValue::Text(s),
        Value::Blob(b) => RawValue::Blob(b),
    }
}
