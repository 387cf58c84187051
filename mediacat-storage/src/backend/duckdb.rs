//! DuckDB backend: progress documents live in native `JSON` columns and list
//! payloads may be native `LIST`s, both reachable with structured path
//! operators.

use std::path::Path;
use std::sync::{Arc, Mutex};

use ::duckdb::types::{TimeUnit, Value};
use ::duckdb::{params_from_iter, Connection};
use chrono::{DateTime, NaiveTime, SecondsFormat};
use mediacat_types::MediaKind;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{ensure_live, row_count, RawBatch, RecentBackend, RecentStatements};
use crate::config::StorageEngine;
use crate::error::{StorageError, StorageResult};
use crate::predicate::{column_ref, SqlDialect};
use crate::request::RecentRequest;
use crate::row::{self, RawRow, RawValue};

/// Open a DuckDB connection with stale WAL recovery.
///
/// If the initial open fails and a `.wal` file exists alongside the database,
/// it is removed and the open is retried once. This handles the common case
/// where an unclean shutdown leaves a WAL file that prevents reopening.
pub fn open_duckdb_with_wal_recovery(path: &Path) -> StorageResult<Connection> {
    match Connection::open(path) {
        Ok(conn) => Ok(conn),
        Err(first_err) => {
            let wal_path = path.with_extension(
                path.extension()
                    .map(|ext| format!("{}.wal", ext.to_string_lossy()))
                    .unwrap_or_else(|| "wal".to_string()),
            );
            if wal_path.exists() {
                warn!(
                    "DuckDB open failed, removing stale WAL and retrying: {}",
                    wal_path.display()
                );
                if std::fs::remove_file(&wal_path).is_ok() {
                    return Connection::open(path).map_err(Into::into);
                }
            }
            Err(first_err.into())
        }
    }
}

/// `->` / `->>` JSON operators with numeric casts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbDialect;

impl SqlDialect for DuckDbDialect {
    fn latest_count_positive(&self, kind: MediaKind) -> String {
        format!(
            "TRY_CAST({}->'latest'->>'{}' AS DOUBLE) > 0",
            column_ref(kind, kind.progress_column()),
            kind.latest_count_key()
        )
    }

    fn latest_updated_at_desc(&self, kind: MediaKind) -> String {
        format!(
            "TRY_CAST({}->'latest'->>'updatedAt' AS DOUBLE) DESC NULLS LAST",
            column_ref(kind, kind.progress_column())
        )
    }
}

/// Recent listing over a DuckDB catalog.
pub struct DuckDbBackend {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Opens the catalog database at `path`.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = open_duckdb_with_wal_recovery(path)?;
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

impl RecentBackend for DuckDbBackend {
    fn engine(&self) -> StorageEngine {
        StorageEngine::DuckDb
    }

    fn fetch_batch(
        &self,
        request: &RecentRequest,
        cancel: &CancellationToken,
    ) -> StorageResult<RawBatch> {
        let statements = RecentStatements::build(&DuckDbDialect, request);
        let columns = row::columns(request.kind());
        debug!("duckdb recent page: {}", statements.page);

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

        debug!("duckdb fetched {} of {} {} rows", rows.len(), total, request.kind());
        Ok(RawBatch {
            total: row_count(total),
            rows,
        })
    }
}

fn raw_value(value: Value) -> RawValue {
    match value {
        Value::Null => RawValue::Null,
        Value::Boolean(b) => RawValue::Bool(b),
        Value::TinyInt(i) => RawValue::Integer(i.into()),
        Value::SmallInt(i) => RawValue::Integer(i.into()),
        Value::Int(i) => RawValue::Integer(i.into()),
        Value::BigInt(i) => RawValue::Integer(i),
        Value::UTinyInt(i) => RawValue::Integer(i.into()),
        Value::USmallInt(i) => RawValue::Integer(i.into()),
        Value::UInt(i) => RawValue::Integer(i.into()),
        Value::UBigInt(i) => {
            i64::try_from(i).map_or(RawValue::Real(i as f64), RawValue::Integer)
        }
        Value::HugeInt(i) => {
            i64::try_from(i).map_or(RawValue::Real(i as f64), RawValue::Integer)
        }
        Value::Float(f) => RawValue::Real(f.into()),
        Value::Double(f) => RawValue::Real(f),
        Value::Text(s) => RawValue::Text(s),
        Value::Blob(b) => RawValue::Blob(b),
        Value::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>().map_or(RawValue::Text(text), RawValue::Real)
        }
        Value::Enum(s) => RawValue::Text(s),
        Value::Timestamp(unit, value) => {
            let micros = to_micros(unit, value);
            DateTime::from_timestamp_micros(micros).map_or(RawValue::Integer(micros / 1_000), |dt| {
                RawValue::Text(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            })
        }
        Value::Date32(days) => DateTime::from_timestamp(i64::from(days) * 86_400, 0)
            .map_or(RawValue::Integer(i64::from(days)), |dt| {
                RawValue::Text(dt.date_naive().to_string())
            }),
        Value::Time64(unit, value) => {
            let micros = to_micros(unit, value);
            let secs = u32::try_from(micros.div_euclid(1_000_000)).unwrap_or(0);
            let nanos = u32::try_from(micros.rem_euclid(1_000_000) * 1_000).unwrap_or(0);
            NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                .map_or(RawValue::Integer(micros), |t| RawValue::Text(t.to_string()))
        }
        Value::Interval { months, days, nanos } => RawValue::Json(serde_json::json!({
            "months": months,
            "days": days,
            "nanos": nanos,
        })),
        Value::List(items) | Value::Array(items) => RawValue::Json(serde_json::Value::Array(
            items.into_iter().map(json_value).collect(),
        )),
        Value::Struct(fields) => RawValue::Json(serde_json::Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), json_value(value.clone())))
                .collect(),
        )),
        Value::Map(entries) => RawValue::Json(serde_json::Value::Object(
            entries
                .iter()
                .map(|(key, value)| (map_key(key.clone()), json_value(value.clone())))
                .collect(),
        )),
        Value::Union(inner) => raw_value(*inner),
        #[allow(unreachable_patterns)]
        other => {
            warn!("unsupported duckdb value {:?}, reading as null", other);
            RawValue::Null
        }
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

/// JSON object keys must be strings; non-text map keys use their JSON text.
fn map_key(key: Value) -> String {
    match json_value(key) {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

fn json_value(value: Value) -> serde_json::Value {
    match raw_value(value) {
        RawValue::Null => serde_json::Value::Null,
        RawValue::Bool(b) => serde_json::Value::Bool(b),
        RawValue::Integer(i) => i.into(),
        RawValue::Real(f) => f.into(),
        RawValue::Text(s) => serde_json::Value::String(s),
        RawValue::Blob(b) => serde_json::Value::String(String::from_utf8_lossy(&b).into_owned()),
        RawValue::Json(v) => v,
    }
}
