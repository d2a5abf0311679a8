//! Linear schema provisioning.
//!
//! Every run replays all scripts in filename order. Scripts must be
//! idempotent (`IF NOT EXISTS`); nothing records which ones already ran.
//! Each script executes in its own transaction, and the first failure
//! aborts the replay.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::database::Database;
use crate::error::StoreError;

/// A named SQL script.
#[derive(Clone, Debug)]
pub struct MigrationScript {
    pub name: Cow<'static, str>,
    pub sql: Cow<'static, str>,
}

/// Scripts compiled into the binary, in application order.
const EMBEDDED: &[(&str, &str)] = &[
    (
        "001_development_tasks.sql",
        include_str!("../migrations/001_development_tasks.sql"),
    ),
    (
        "002_ai_interactions.sql",
        include_str!("../migrations/002_ai_interactions.sql"),
    ),
    (
        "003_foundation_invariants.sql",
        include_str!("../migrations/003_foundation_invariants.sql"),
    ),
];

/// Where to read scripts from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MigrationSource {
    Embedded,
    /// Every `0*.sql` file in the directory.
    Directory(PathBuf),
}

impl MigrationSource {
    pub fn from_dir(dir: Option<PathBuf>) -> Self {
        dir.map_or(Self::Embedded, Self::Directory)
    }

    /// Load scripts sorted by filename. `None` if the directory does not exist.
    pub fn load(&self) -> Result<Option<Vec<MigrationScript>>, StoreError> {
        match self {
            Self::Embedded => Ok(Some(
                EMBEDDED
                    .iter()
                    .map(|(name, sql)| MigrationScript {
                        name: Cow::Borrowed(*name),
                        sql: Cow::Borrowed(*sql),
                    })
                    .collect(),
            )),
            Self::Directory(dir) => load_dir(dir),
        }
    }
}

fn load_dir(dir: &Path) -> Result<Option<Vec<MigrationScript>>, StoreError> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| StoreError::Io(format!("read {}: {e}", dir.display())))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::Io(format!("read {}: {e}", dir.display())))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('0') && name.ends_with(".sql") {
            names.push(name);
        }
    }
    names.sort();

    let mut scripts = Vec::with_capacity(names.len());
    for name in names {
        let path = dir.join(&name);
        let sql = std::fs::read_to_string(&path)
            .map_err(|e| StoreError::Io(format!("read {}: {e}", path.display())))?;
        scripts.push(MigrationScript {
            name: Cow::Owned(name),
            sql: Cow::Owned(sql),
        });
    }
    Ok(Some(scripts))
}

/// Replay every script from `source`. Returns how many were applied.
///
/// A missing migrations directory is logged and treated as nothing to do.
pub fn run_migrations(db: &Database, source: &MigrationSource) -> Result<usize, StoreError> {
    let Some(scripts) = source.load()? else {
        if let MigrationSource::Directory(dir) = source {
            warn!(dir = %dir.display(), "no migrations directory found, skipping");
        }
        return Ok(0);
    };

    db.with_conn(|conn| {
        for script in &scripts {
            info!(name = %script.name, "running migration");
            apply(conn, script)?;
        }
        Ok(())
    })?;

    info!(count = scripts.len(), "all migrations applied");
    Ok(scripts.len())
}

fn apply(conn: &mut Connection, script: &MigrationScript) -> Result<(), StoreError> {
    let tx = conn.transaction().map_err(|e| StoreError::Migration {
        message: format!("failed to begin transaction for {}: {e}", script.name),
    })?;

    tx.execute_batch(&script.sql)
        .map_err(|e| StoreError::Migration {
            message: format!("{} failed: {e}", script.name),
        })?;

    tx.commit().map_err(|e| StoreError::Migration {
        message: format!("failed to commit {}: {e}", script.name),
    })?;

    debug!(name = %script.name, "migration committed");
    Ok(())
}
