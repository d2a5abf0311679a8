use rusqlite::Row;
use tracing::instrument;

use dev_memory_core::{Context, Task, TaskFields, TaskId};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{self, get, get_opt};

const TABLE: &str = "development_tasks";
const COLUMNS: &str = "id, title, description, status, changes, context, created_at, updated_at";

pub struct TaskRepo {
    db: Database,
}

impl TaskRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new task. `status` and `changes` take their column defaults.
    #[instrument(skip(self, context))]
    pub fn insert(
        &self,
        title: &str,
        description: Option<&str>,
        context: &Context,
    ) -> Result<Task, StoreError> {
        let id = TaskId::new();
        let now = row_helpers::now();
        let context = serde_json::to_string(context)?;
        self.db.query_one(
            &format!(
                "INSERT INTO development_tasks
                     (id, title, description, context, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 RETURNING {COLUMNS}"
            ),
            rusqlite::params![id.as_str(), title, description, context, now],
            row_to_task,
        )
    }

    #[instrument(skip(self), fields(task_id = %id))]
    pub fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        self.db.query_opt(
            &format!("SELECT {COLUMNS} FROM development_tasks WHERE id = ?1"),
            [id.as_str()],
            row_to_task,
        )
    }

    #[instrument(skip(self), fields(task_id = %id))]
    pub fn exists(&self, id: &TaskId) -> Result<bool, StoreError> {
        let found = self.db.query_opt(
            "SELECT 1 FROM development_tasks WHERE id = ?1",
            [id.as_str()],
            |_| Ok(()),
        )?;
        Ok(found.is_some())
    }

    /// All tasks, newest first. Ties on `created_at` fall back to insertion order.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Task>, StoreError> {
        self.db.query(
            &format!(
                "SELECT {COLUMNS} FROM development_tasks ORDER BY created_at DESC, rowid DESC"
            ),
            [],
            row_to_task,
        )
    }

    /// Overwrite every mutable column and refresh `updated_at` in one statement.
    /// Returns `None` if the row no longer exists.
    #[instrument(skip(self, fields), fields(task_id = %id))]
    pub fn update(&self, id: &TaskId, fields: &TaskFields) -> Result<Option<Task>, StoreError> {
        let changes = serde_json::to_string(&fields.changes)?;
        let context = serde_json::to_string(&fields.context)?;
        self.db.query_opt(
            &format!(
                "UPDATE development_tasks
                 SET title = ?2, description = ?3, status = ?4,
                     changes = ?5, context = ?6, updated_at = ?7
                 WHERE id = ?1
                 RETURNING {COLUMNS}"
            ),
            rusqlite::params![
                id.as_str(),
                fields.title,
                fields.description,
                fields.status,
                changes,
                context,
                row_helpers::now(),
            ],
            row_to_task,
        )
    }
}

fn row_to_task(row: &Row<'_>) -> Result<Task, StoreError> {
    let changes: String = get(row, 4, TABLE, "changes")?;
    let context: String = get(row, 5, TABLE, "context")?;
    Ok(Task {
        id: TaskId::from_raw(get::<String>(row, 0, TABLE, "id")?),
        title: get(row, 1, TABLE, "title")?,
        description: get_opt(row, 2, TABLE, "description")?,
        status: get(row, 3, TABLE, "status")?,
        changes: row_helpers::parse_json(&changes, TABLE, "changes")?,
        context: row_helpers::parse_json(&context, TABLE, "context")?,
        created_at: get(row, 6, TABLE, "created_at")?,
        updated_at: get(row, 7, TABLE, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_db() -> Database {
        Database::in_memory().unwrap()
    }

    fn ctx(value: serde_json::Value) -> Context {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn insert_applies_defaults() {
        let repo = TaskRepo::new(test_db());
        let task = repo.insert("Refactor auth", None, &Context::new()).unwrap();
        assert!(task.id.as_str().starts_with("task_"));
        assert_eq!(task.title, "Refactor auth");
        assert_eq!(task.description, None);
        assert_eq!(task.status, "pending");
        assert!(task.changes.is_empty());
        assert!(task.context.is_empty());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn get_returns_inserted_row() {
        let repo = TaskRepo::new(test_db());
        let task = repo
            .insert("Add cache", Some("LRU in front of store"), &ctx(json!({"risk": "low"})))
            .unwrap();
        let fetched = repo.get(&task.id).unwrap().unwrap();
        assert_eq!(fetched, task);
        assert_eq!(fetched.context["risk"], json!("low"));
    }

    #[test]
    fn get_missing_is_none() {
        let repo = TaskRepo::new(test_db());
        assert!(repo.get(&TaskId::from_raw("task_missing")).unwrap().is_none());
        assert!(!repo.exists(&TaskId::from_raw("task_missing")).unwrap());
    }

    #[test]
    fn list_newest_first() {
        let repo = TaskRepo::new(test_db());
        let a = repo.insert("a", None, &Context::new()).unwrap();
        let b = repo.insert("b", None, &Context::new()).unwrap();
        let c = repo.insert("c", None, &Context::new()).unwrap();
        let ids: Vec<TaskId> = repo.list().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[test]
    fn list_breaks_timestamp_ties_by_insertion() {
        let db = test_db();
        for id in ["task_x", "task_y"] {
            db.execute(
                "INSERT INTO development_tasks (id, title, created_at, updated_at)
                 VALUES (?1, 't', '2026-01-01T00:00:00.000000Z', '2026-01-01T00:00:00.000000Z')",
                [id],
            )
            .unwrap();
        }
        let ids: Vec<String> = TaskRepo::new(db)
            .list()
            .unwrap()
            .into_iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(ids, vec!["task_y", "task_x"]);
    }

    #[test]
    fn update_overwrites_fields() {
        let repo = TaskRepo::new(test_db());
        let task = repo.insert("old", Some("desc"), &Context::new()).unwrap();
        let fields = TaskFields {
            title: "new".into(),
            description: None,
            status: "done".into(),
            changes: vec![json!("one")],
            context: ctx(json!({"k": true})),
        };
        let updated = repo.update(&task.id, &fields).unwrap().unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.description, None);
        assert_eq!(updated.status, "done");
        assert_eq!(updated.changes, vec![json!("one")]);
        assert_eq!(updated.context["k"], json!(true));
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[test]
    fn update_missing_is_none() {
        let repo = TaskRepo::new(test_db());
        let fields = TaskFields {
            title: "t".into(),
            description: None,
            status: "pending".into(),
            changes: vec![],
            context: Context::new(),
        };
        assert!(repo.update(&TaskId::from_raw("task_gone"), &fields).unwrap().is_none());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn corrupt_changes_column_reported() {
        let db = test_db();
        db.execute(
            "INSERT INTO development_tasks (id, title, changes, created_at, updated_at)
             VALUES ('task_bad', 't', 'not json', 'x', 'x')",
            [],
        )
        .unwrap();
        let err = TaskRepo::new(db).get(&TaskId::from_raw("task_bad")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::CorruptRow { table: "development_tasks", column: "changes", .. }
        ));
    }
}
