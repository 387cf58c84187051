//! Storage backends for the recent listing.
//!
//! Each backend owns a locked connection and runs the count and page queries
//! inside one read transaction, so both observe the same snapshot. Everything
//! engine-specific (JSON path syntax, value decoding) lives here and in the
//! backend's [`SqlDialect`].

mod duckdb;
mod sqlite;

pub use self::duckdb::{open_duckdb_with_wal_recovery, DuckDbBackend, DuckDbDialect};
pub use self::sqlite::{SqliteBackend, SqliteDialect};

use mediacat_types::MediaKind;
use tokio_util::sync::CancellationToken;

use crate::config::StorageEngine;
use crate::error::{StorageError, StorageResult};
use crate::predicate::{column_ref, Predicate, SqlDialect};
use crate::request::{PageWindow, RecentRequest};
use crate::row::{self, RawRow};

/// Rows for one page plus the total number of matching rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBatch {
    pub total: u64,
    pub rows: Vec<RawRow>,
}

/// A storage engine that can serve the recent listing.
pub trait RecentBackend: Send + Sync {
    /// Engine this backend talks to.
    fn engine(&self) -> StorageEngine;

    /// Counts matching rows and fetches the requested page, in that order,
    /// against a single snapshot.
    ///
    /// Returns [`StorageError::Cancelled`] if `cancel` fires before the page
    /// has been read completely.
    fn fetch_batch(
        &self,
        request: &RecentRequest,
        cancel: &CancellationToken,
    ) -> StorageResult<RawBatch>;
}

/// The two statements issued for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentStatements {
    pub count: String,
    pub page: String,
    pub params: Vec<String>,
}

impl RecentStatements {
    pub fn build<D: SqlDialect + ?Sized>(dialect: &D, request: &RecentRequest) -> Self {
        let kind = request.kind();
        let predicate = Predicate::build(dialect, kind, request.formats());
        Self {
            count: count_statement(kind, &predicate),
            page: page_statement(dialect, kind, &predicate, request.window()),
            params: predicate.params().to_vec(),
        }
    }
}

fn count_statement(kind: MediaKind, predicate: &Predicate) -> String {
    format!(
        "SELECT COUNT(*) FROM \"{}\" {}",
        kind.table(),
        predicate.where_clause()
    )
}

fn page_statement<D: SqlDialect + ?Sized>(
    dialect: &D,
    kind: MediaKind,
    predicate: &Predicate,
    window: PageWindow,
) -> String {
    let select_list = row::columns(kind)
        .iter()
        .map(|column| column_ref(kind, column))
        .collect::<Vec<_>>()
        .join(", ");
    // LIMIT/OFFSET are integers computed from validated u32 input.
    format!(
        "SELECT {select_list} FROM \"{}\" {} ORDER BY {} LIMIT {} OFFSET {}",
        kind.table(),
        predicate.where_clause(),
        dialect.latest_updated_at_desc(kind),
        window.limit(),
        window.offset(),
    )
}

fn ensure_live(cancel: &CancellationToken) -> StorageResult<()> {
    if cancel.is_cancelled() {
        Err(StorageError::Cancelled)
    } else {
        Ok(())
    }
}

fn row_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
