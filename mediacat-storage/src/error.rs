//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that fail a whole request.
///
/// Problems confined to a single row never show up here; see
/// [`RowError`](crate::RowError).
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage engine missing, unsupported or already set to something else.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database error from DuckDB.
    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),

    /// Database error from SQLite.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Request rejected before any query was built.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller cancelled the request; any open transaction was rolled back.
    #[error("request cancelled")]
    Cancelled,

    /// A connection mutex was poisoned by a panicking holder.
    #[error("connection lock poisoned")]
    Poisoned,

    /// The blocking query task panicked or was aborted.
    #[error("query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<mediacat_types::Error> for StorageError {
    fn from(err: mediacat_types::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
