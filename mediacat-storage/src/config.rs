//! Storage engine selection.
//!
//! The engine is a process-wide setting: it is installed once at startup and
//! read for the rest of the process lifetime. This module is the only place
//! outside the backends that knows which engines exist.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::backend::{DuckDbBackend, RecentBackend, SqliteBackend};
use crate::error::{StorageError, StorageResult};
use crate::feed::RecentFeed;

/// Environment variable naming the storage engine.
pub const ENGINE_ENV: &str = "MEDIACAT_DB_ENGINE";

/// Environment variable holding the database file path.
pub const PATH_ENV: &str = "MEDIACAT_DB_PATH";

static ACTIVE_ENGINE: OnceLock<StorageEngine> = OnceLock::new();

/// Supported storage engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageEngine {
    /// Structured engine: native JSON columns and path operators.
    DuckDb,
    /// Document-in-column engine: JSON stored as text.
    Sqlite,
}

impl StorageEngine {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DuckDb => "duckdb",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for StorageEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageEngine {
    type Err = StorageError;

    /// `postgres`/`postgresql` select the structured engine as well, so
    /// deployments configured for a relational JSON store keep working.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duckdb" | "postgres" | "postgresql" => Ok(Self::DuckDb),
            "sqlite" => Ok(Self::Sqlite),
            "" => Err(StorageError::Config("storage engine is empty".into())),
            other => Err(StorageError::Config(format!(
                "unsupported storage engine: {other:?}"
            ))),
        }
    }
}

/// Installs the process-wide engine.
///
/// Installing the same engine twice is a no-op; installing a different one
/// after the first is a configuration error.
pub fn install_engine(engine: StorageEngine) -> StorageResult<StorageEngine> {
    let mut installed = false;
    let current = *ACTIVE_ENGINE.get_or_init(|| {
        installed = true;
        engine
    });
    if current != engine {
        return Err(StorageError::Config(format!(
            "storage engine already set to {current}, refusing {engine}"
        )));
    }
    if installed {
        info!("Storage engine set to {}", engine);
    }
    Ok(current)
}

/// The engine installed by [`install_engine`].
pub fn active_engine() -> StorageResult<StorageEngine> {
    ACTIVE_ENGINE
        .get()
        .copied()
        .ok_or_else(|| StorageError::Config("storage engine not configured".into()))
}

/// Startup configuration for the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub engine: StorageEngine,
    /// Database file; `None` opens an in-memory database.
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            engine: StorageEngine::Sqlite,
            path: None,
        }
    }
}

impl StorageConfig {
    /// Reads [`ENGINE_ENV`] (required) and [`PATH_ENV`] (optional).
    pub fn from_env() -> StorageResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StorageResult<Self> {
        let engine = lookup(ENGINE_ENV)
            .ok_or_else(|| StorageError::Config(format!("{ENGINE_ENV} is not set")))?
            .parse()?;
        let path = lookup(PATH_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self { engine, path })
    }

    /// Installs the engine process-wide and opens the matching backend.
    pub fn open_feed(&self) -> StorageResult<RecentFeed> {
        install_engine(self.engine)?;
        RecentFeed::from_active(self.open_backend()?)
    }

    /// Opens the backend for this configuration without touching
    /// process-wide state.
    pub fn open_backend(&self) -> StorageResult<Arc<dyn RecentBackend>> {
        let backend: Arc<dyn RecentBackend> = match (self.engine, &self.path) {
            (StorageEngine::DuckDb, Some(path)) => Arc::new(DuckDbBackend::open(path)?),
            (StorageEngine::DuckDb, None) => Arc::new(DuckDbBackend::open_in_memory()?),
            (StorageEngine::Sqlite, Some(path)) => Arc::new(SqliteBackend::open(path)?),
            (StorageEngine::Sqlite, None) => Arc::new(SqliteBackend::open_in_memory()?),
        };
        Ok(backend)
    }
}
