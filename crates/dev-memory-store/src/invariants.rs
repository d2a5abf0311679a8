use rusqlite::Row;
use tracing::instrument;

use dev_memory_core::{CriticalInvariant, Invariant};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{get, get_opt};

const TABLE: &str = "foundation_invariants";

pub struct InvariantRepo {
    db: Database,
}

impl InvariantRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Active invariants ordered by id.
    #[instrument(skip(self))]
    pub fn list_active(&self) -> Result<Vec<Invariant>, StoreError> {
        self.db.query(
            "SELECT id, title, description, category, severity, active
             FROM foundation_invariants
             WHERE active = 1
             ORDER BY id ASC",
            [],
            row_to_invariant,
        )
    }

    /// Active invariants with `critical` severity, projected for the check.
    #[instrument(skip(self))]
    pub fn list_critical(&self) -> Result<Vec<CriticalInvariant>, StoreError> {
        self.db.query(
            "SELECT id, title, description, category
             FROM foundation_invariants
             WHERE active = 1 AND severity = ?1
             ORDER BY id ASC",
            [Invariant::CRITICAL],
            |row| {
                Ok(CriticalInvariant {
                    id: get(row, 0, TABLE, "id")?,
                    title: get(row, 1, TABLE, "title")?,
                    description: get_opt(row, 2, TABLE, "description")?,
                    category: get_opt(row, 3, TABLE, "category")?,
                })
            },
        )
    }

    /// Insert or replace an invariant by id.
    #[instrument(skip(self, invariant), fields(invariant_id = %invariant.id))]
    pub fn upsert(&self, invariant: &Invariant) -> Result<(), StoreError> {
        self.db.execute(
            "INSERT INTO foundation_invariants (id, title, description, category, severity, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (id) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 category = excluded.category,
                 severity = excluded.severity,
                 active = excluded.active",
            rusqlite::params![
                invariant.id,
                invariant.title,
                invariant.description,
                invariant.category,
                invariant.severity,
                invariant.active,
            ],
        )?;
        Ok(())
    }
}

fn row_to_invariant(row: &Row<'_>) -> Result<Invariant, StoreError> {
    Ok(Invariant {
        id: get(row, 0, TABLE, "id")?,
        title: get(row, 1, TABLE, "title")?,
        description: get_opt(row, 2, TABLE, "description")?,
        category: get_opt(row, 3, TABLE, "category")?,
        severity: get(row, 4, TABLE, "severity")?,
        active: get(row, 5, TABLE, "active")?,
    })
}
