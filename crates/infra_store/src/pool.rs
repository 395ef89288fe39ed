//! SQLite connection pool management
//!
//! Pragma tuning lives here, outside the engine: the engine only assumes
//! a backend with CTEs, parameterized statements, and multi-statement
//! transactions.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::StoreError;

/// Connection pragmas applied to every connection when enabled.
const PRAGMAS: [(&str, &str); 5] = [
    ("journal_mode", "MEMORY"),
    ("synchronous", "OFF"),
    ("cache_size", "100000"),
    ("temp_store", "MEMORY"),
    ("locking_mode", "EXCLUSIVE"),
];

/// Configuration for the SQLite pool.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database file, or `None` for an in-memory database.
    pub path: Option<PathBuf>,
    /// Maximum pool size; in-memory databases are pinned to one
    /// connection so the database outlives individual checkouts.
    pub max_connections: u32,
    /// Whether to apply the tuning pragmas.
    pub apply_pragmas: bool,
    /// How long to wait for a connection checkout.
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    /// An in-memory database, used by tests and scratch work.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            max_connections: 1,
            apply_pragmas: true,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    /// A file-backed database at the given path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            max_connections: 5,
            apply_pragmas: true,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn apply_pragmas(mut self, enabled: bool) -> Self {
        self.apply_pragmas = enabled;
        self
    }
}

/// Creates a connection pool for the given configuration.
pub async fn connect(config: &StoreConfig) -> Result<SqlitePool, StoreError> {
    let mut options = match &config.path {
        Some(path) => SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true),
        None => SqliteConnectOptions::new().in_memory(true),
    };
    if config.apply_pragmas {
        for (key, value) in PRAGMAS {
            options = options.pragma(key, value);
        }
    }

    // An in-memory database lives and dies with its connection.
    let in_memory = config.path.is_none();
    let max_connections = if in_memory { 1 } else { config.max_connections };
    let min_connections = if in_memory { 1 } else { 0 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| StoreError::backend("pool creation", e))?;

    info!(
        max_connections,
        in_memory, "sqlite pool ready"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_config_is_single_connection() {
        let config = StoreConfig::in_memory();
        assert!(config.path.is_none());
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn builder_overrides_apply() {
        let config = StoreConfig::at_path("/tmp/history.db")
            .max_connections(8)
            .apply_pragmas(false);
        assert_eq!(config.max_connections, 8);
        assert!(!config.apply_pragmas);
    }
}
