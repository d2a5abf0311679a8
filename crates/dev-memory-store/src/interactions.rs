use rusqlite::Row;
use tracing::instrument;

use dev_memory_core::{Context, Interaction, InteractionId, TaskId};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{self, get, get_opt};

const TABLE: &str = "ai_interactions";
const COLUMNS: &str = "id, task_id, role, content, context, created_at";

pub struct InteractionRepo {
    db: Database,
}

impl InteractionRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append an interaction. Fails with a constraint error if the task row is missing.
    #[instrument(skip(self, content, context), fields(task_id = %task_id))]
    pub fn append(
        &self,
        task_id: &TaskId,
        role: &str,
        content: Option<&str>,
        context: &Context,
    ) -> Result<Interaction, StoreError> {
        let id = InteractionId::new();
        let context = serde_json::to_string(context)?;
        self.db.query_one(
            &format!(
                "INSERT INTO ai_interactions (id, task_id, role, content, context, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {COLUMNS}"
            ),
            rusqlite::params![
                id.as_str(),
                task_id.as_str(),
                role,
                content,
                context,
                row_helpers::now(),
            ],
            row_to_interaction,
        )
    }

    /// Interactions for one task, oldest first.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub fn list_for_task(&self, task_id: &TaskId) -> Result<Vec<Interaction>, StoreError> {
        self.db.query(
            &format!(
                "SELECT {COLUMNS} FROM ai_interactions
                 WHERE task_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ),
            [task_id.as_str()],
            row_to_interaction,
        )
    }
}

fn row_to_interaction(row: &Row<'_>) -> Result<Interaction, StoreError> {
    let context: String = get(row, 4, TABLE, "context")?;
    Ok(Interaction {
        id: InteractionId::from_raw(get::<String>(row, 0, TABLE, "id")?),
        task_id: TaskId::from_raw(get::<String>(row, 1, TABLE, "task_id")?),
        role: get(row, 2, TABLE, "role")?,
        content: get_opt(row, 3, TABLE, "content")?,
        context: row_helpers::parse_json(&context, TABLE, "context")?,
        created_at: get(row, 5, TABLE, "created_at")?,
    })
}
