//! Recent-activity retrieval for the mediacat catalog.
//!
//! Answers one question: which anime or manga were updated most recently,
//! filtered by format and paginated. The catalog may live in either of two
//! engines with different capabilities:
//!
//! - **DuckDB** keeps progress documents in native `JSON` columns and can use
//!   structured path operators in queries
//! - **SQLite** keeps every JSON payload as text, so documents are guarded with
//!   `json_valid` in queries and parsed after the fetch
//!
//! # Pipeline
//!
//! 1. [`RecentRequest`] validates kind, format tags and page size
//! 2. [`Predicate`] builds the WHERE clause with bound format parameters
//! 3. a [`RecentBackend`] counts and fetches the page in one transaction
//! 4. [`row::normalize_rows`] turns raw rows into [`Media`], skipping corrupt rows
//! 5. [`recency::order_by_recency`] drops unreleased entries and sorts by
//!    `updatedAt`, newest first
//!
//! Page boundaries follow the storage-level ORDER BY; the final sort only
//! reorders entries within the fetched page.
//!
//! [`Media`]: mediacat_types::Media

mod backend;
mod config;
mod error;
mod feed;
mod predicate;
pub mod recency;
mod request;
pub mod row;

pub use backend::{
    open_duckdb_with_wal_recovery, DuckDbBackend, DuckDbDialect, RawBatch, RecentBackend,
    RecentStatements, SqliteBackend, SqliteDialect,
};
pub use config::{
    active_engine, install_engine, StorageConfig, StorageEngine, ENGINE_ENV, PATH_ENV,
};
pub use error::{StorageError, StorageResult};
pub use feed::RecentFeed;
pub use predicate::{column_ref, Predicate, SqlDialect};
pub use request::{PageWindow, RecentPage, RecentRequest};
pub use row::{RawRow, RawValue, RowError};
