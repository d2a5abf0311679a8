use rusqlite::{Connection, Params, Row};
use tracing::info;

use crate::connection::{self, ConnectionConfig, ConnectionPool, DatabaseTarget};
use crate::error::StoreError;
use crate::migrations;

/// Pooled SQLite handle shared by every repository.
///
/// Each call checks a connection out of the pool for the duration of the
/// closure and returns it on drop, including on error paths. No retries.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
    target: DatabaseTarget,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("Database")
            .field("target", &self.target)
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl Database {
    /// Open a pool for `url`. The schema is not touched; run migrations separately.
    pub fn open(url: &str, config: &ConnectionConfig) -> Result<Self, StoreError> {
        let target = DatabaseTarget::parse(url)?;
        let pool = match &target {
            DatabaseTarget::Memory => connection::new_in_memory(config)?,
            DatabaseTarget::File(path) => connection::new_file(path, config)?,
        };

        info!(database = %target, pool_size = pool.max_size(), "database pool opened");

        Ok(Self { pool, target })
    }

    /// Open an in-memory database with the embedded schema applied (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let db = Self::open(":memory:", &ConnectionConfig::default())?;
        let _ = migrations::run_migrations(&db, &migrations::MigrationSource::Embedded)?;
        Ok(db)
    }

    /// Execute a closure with a pooled connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut conn = self.pool.get()?;
        f(&mut *conn)
    }

    /// Run a single statement and return the affected row count.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize, StoreError> {
        self.with_conn(|conn| Ok(conn.execute(sql, params)?))
    }

    /// Run a query and map every row, preserving order.
    pub fn query<T, P, F>(&self, sql: &str, params: P, mut map: F) -> Result<Vec<T>, StoreError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> Result<T, StoreError>,
    {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query(params)?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                out.push(map(row)?);
            }
            Ok(out)
        })
    }

    /// Run a query and map the first row, if any.
    pub fn query_opt<T, P, F>(
        &self,
        sql: &str,
        params: P,
        map: F,
    ) -> Result<Option<T>, StoreError>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> Result<T, StoreError>,
    {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query(params)?;
            let Some(row) = rows.next()? else {
                return Ok(None);
            };
            map(row).map(Some)
        })
    }

    /// Run a query that must yield exactly one row (e.g. `INSERT ... RETURNING`).
    pub fn query_one<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<T, StoreError>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> Result<T, StoreError>,
    {
        self.query_opt(sql, params, map)?
            .ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Round-trip `SELECT 1` through a pooled connection.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let _: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
            Ok(())
        })
    }

    pub fn target(&self) -> &DatabaseTarget {
        &self.target
    }

    /// Connections currently checked out or idle in the pool.
    pub fn pool_state(&self) -> r2d2::State {
        self.pool.state()
    }
}
