//! `SQLite` connection pool with WAL mode and foreign keys enabled.
//!
//! The [`PragmaCustomizer`] runs on each new connection so every pooled
//! handle sees the same pragmas.

use std::path::PathBuf;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::StoreError;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 10).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 5000).
    pub busy_timeout_ms: u32,
    /// How long a caller waits for a free connection (default: 5s).
    pub connection_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            busy_timeout_ms: 5_000,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

/// Where the database lives, parsed from a `DATABASE_URL`-style string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// Accepts a plain path, `sqlite://<path>`, `sqlite:<path>` or `:memory:`.
    pub fn parse(url: &str) -> Result<Self, StoreError> {
        let url = url.trim();
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);

        if rest.is_empty() {
            return Err(StoreError::InvalidUrl(url.to_owned()));
        }
        if rest == ":memory:" {
            return Ok(Self::Memory);
        }
        if rest.contains("://") {
            return Err(StoreError::InvalidUrl(url.to_owned()));
        }
        Ok(Self::File(PathBuf::from(rest)))
    }
}

impl std::fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => f.write_str(":memory:"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// `SQLite` pragma customizer that runs on each new connection.
#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))
    }
}

/// Create an in-memory connection pool.
///
/// Every in-memory connection is its own database, so the pool holds exactly
/// one connection and never reaps or recycles it.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool, StoreError> {
    let pool = builder(config)
        .max_size(1)
        .min_idle(Some(1))
        .idle_timeout(None)
        .max_lifetime(None)
        .build(SqliteConnectionManager::memory())?;
    Ok(pool)
}

/// Create a file-backed connection pool, creating parent directories.
pub fn new_file(
    path: &std::path::Path,
    config: &ConnectionConfig,
) -> Result<ConnectionPool, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| StoreError::Io(format!("create dir: {e}")))?;
    }
    let pool = builder(config)
        .max_size(config.pool_size)
        .build(SqliteConnectionManager::file(path))?;
    Ok(pool)
}

fn builder(config: &ConnectionConfig) -> r2d2::Builder<SqliteConnectionManager> {
    Pool::builder()
        .connection_timeout(config.connection_timeout)
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
}

/// Pragma state for verification.
#[derive(Debug)]
pub struct PragmaState {
    pub journal_mode: String,
    pub foreign_keys_enabled: bool,
}

/// Read back the pragmas applied by the customizer.
pub fn verify_pragmas(conn: &Connection) -> Result<PragmaState, StoreError> {
    let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
    let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    Ok(PragmaState {
        journal_mode,
        foreign_keys_enabled: foreign_keys == 1,
    })
}
