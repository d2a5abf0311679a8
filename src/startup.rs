use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use dev_memory_core::Invariant;
use dev_memory_server::{DevMemoryServer, ServerConfig};
use dev_memory_service::Services;
use dev_memory_settings::Settings;
use dev_memory_store::{
    run_migrations, ConnectionConfig, Database, InvariantRepo, MigrationSource, StoreError,
};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("DATABASE_URL environment variable is required.")]
    MissingDatabaseUrl,

    #[error("failed to open database: {0}")]
    Open(#[source] StoreError),

    #[error("database connection failed: {0}")]
    Unreachable(#[source] StoreError),

    #[error("migrations failed: {0}")]
    Migration(#[source] StoreError),

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),

    #[error("failed to read {path:?}: {source}")]
    SeedRead { path: PathBuf, source: io::Error },

    #[error("invalid invariants file {path:?}: {source}")]
    SeedParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to seed invariants: {0}")]
    Seed(#[source] StoreError),
}

pub fn connection_config(settings: &Settings) -> ConnectionConfig {
    ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
        connection_timeout: Duration::from_secs(settings.database.connection_timeout_secs),
    }
}

pub fn server_config(settings: &Settings) -> ServerConfig {
    ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
        shutdown_timeout_secs: settings.server.shutdown_timeout_secs,
    }
}

/// Open the pool and prove the store answers before anything else happens.
pub fn open_database(settings: &Settings) -> Result<Database, StartupError> {
    let url = settings
        .database
        .url
        .as_deref()
        .ok_or(StartupError::MissingDatabaseUrl)?;
    let db = Database::open(url, &connection_config(settings)).map_err(StartupError::Open)?;
    db.ping().map_err(StartupError::Unreachable)?;
    info!(database = %db.target(), "database connection verified");
    Ok(db)
}

pub fn migrate(db: &Database, settings: &Settings) -> Result<usize, StartupError> {
    let source = MigrationSource::from_dir(settings.migrations.dir.clone());
    run_migrations(db, &source).map_err(StartupError::Migration)
}

pub fn read_seed_file(path: &Path) -> Result<Vec<Invariant>, StartupError> {
    let raw = std::fs::read_to_string(path).map_err(|source| StartupError::SeedRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StartupError::SeedParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Upsert every invariant in order. Returns how many were written.
pub fn seed_invariants(db: &Database, invariants: &[Invariant]) -> Result<usize, StartupError> {
    let repo = InvariantRepo::new(db.clone());
    for invariant in invariants {
        repo.upsert(invariant).map_err(StartupError::Seed)?;
        info!(id = %invariant.id, severity = %invariant.severity, "invariant seeded");
    }
    Ok(invariants.len())
}

/// Open, verify, migrate, then serve until a shutdown signal arrives.
pub async fn serve(settings: &Settings, skip_migrations: bool) -> Result<(), StartupError> {
    let db = open_database(settings)?;
    if settings.migrations.run_on_startup && !skip_migrations {
        migrate(&db, settings)?;
    } else {
        info!("skipping migrations");
    }

    let server = DevMemoryServer::new(server_config(settings), Services::from_database(db));
    let listener = server.bind().await.map_err(|source| StartupError::Bind {
        addr: server.config().bind_addr(),
        source,
    })?;

    let _signals = server.shutdown().listen_for_signals();
    server.serve(listener).await.map_err(StartupError::Serve)?;
    info!("database pool closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use dev_memory_store::TaskRepo;

    fn settings_for(url: Option<String>) -> Settings {
        let mut settings = Settings::default();
        settings.database.url = url;
        settings
    }

    fn file_settings(dir: &tempfile::TempDir) -> Settings {
        let path = dir.path().join("data").join("dev-memory.db");
        settings_for(Some(format!("sqlite://{}", path.display())))
    }

    #[test]
    fn missing_url_is_reported() {
        let err = open_database(&settings_for(None)).unwrap_err();
        assert_matches!(err, StartupError::MissingDatabaseUrl);
        assert_eq!(err.to_string(), "DATABASE_URL environment variable is required.");
    }

    #[test]
    fn settings_flow_into_configs() {
        let mut settings = Settings::default();
        settings.database.pool_size = 3;
        settings.database.connection_timeout_secs = 7;
        settings.server.port = 4000;
        let conn = connection_config(&settings);
        assert_eq!(conn.pool_size, 3);
        assert_eq!(conn.connection_timeout, Duration::from_secs(7));
        let server = server_config(&settings);
        assert_eq!(server.port, 4000);
        assert_eq!(server.host, "0.0.0.0");
    }

    #[test]
    fn open_and_migrate_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let settings = file_settings(&dir);
        let db = open_database(&settings).unwrap();
        assert_eq!(migrate(&db, &settings).unwrap(), 3);
        assert_eq!(migrate(&db, &settings).unwrap(), 3);

        let tasks = TaskRepo::new(db);
        assert!(tasks.list().unwrap().is_empty());
    }

    #[test]
    fn migrations_from_missing_dir_apply_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = file_settings(&dir);
        settings.migrations.dir = Some(dir.path().join("nope"));
        let db = open_database(&settings).unwrap();
        assert_eq!(migrate(&db, &settings).unwrap(), 0);
    }

    #[test]
    fn seed_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = file_settings(&dir);
        let db = open_database(&settings).unwrap();
        migrate(&db, &settings).unwrap();

        let seed = dir.path().join("invariants.json");
        std::fs::write(
            &seed,
            r#"[
                {"id": "INV-1", "title": "Never drop tables", "severity": "critical"},
                {"id": "INV-2", "title": "Prefer small commits"}
            ]"#,
        )
        .unwrap();

        let invariants = read_seed_file(&seed).unwrap();
        assert_eq!(seed_invariants(&db, &invariants).unwrap(), 2);
        assert_eq!(seed_invariants(&db, &invariants).unwrap(), 2);

        let repo = InvariantRepo::new(db);
        assert_eq!(repo.list_active().unwrap().len(), 2);
        let critical = repo.list_critical().unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].id, "INV-1");
    }

    #[test]
    fn bad_seed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_matches!(read_seed_file(&missing), Err(StartupError::SeedRead { .. }));

        let garbled = dir.path().join("garbled.json");
        std::fs::write(&garbled, r#"{"id": "INV-1"}"#).unwrap();
        assert_matches!(read_seed_file(&garbled), Err(StartupError::SeedParse { .. }));
    }
}
