use std::sync::Arc;

use tracing::{debug, instrument};

use dev_memory_core::{merge_update, CreateTaskRequest, Task, TaskId, TaskPatch};

use crate::error::ServiceError;
use crate::store::TaskStore;

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Create a task. Nothing is written when the title is missing or empty.
    #[instrument(skip(self, req))]
    pub fn create(&self, req: CreateTaskRequest) -> Result<Task, ServiceError> {
        let title = req
            .title
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::validation("title is required"))?;
        let description = req.description.filter(|d| !d.is_empty());
        let context = req.context.unwrap_or_default();

        let task = self
            .store
            .insert_task(&title, description.as_deref(), &context)?;
        debug!(task_id = %task.id, "task created");
        Ok(task)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    pub fn get(&self, id: &TaskId) -> Result<Task, ServiceError> {
        self.store
            .get_task(id)?
            .ok_or_else(ServiceError::task_not_found)
    }

    /// All tasks, newest first.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.store.list_tasks()?)
    }

    /// Read, merge, write back.
    ///
    /// The read and the write are separate statements with no isolation
    /// between them: two concurrent updates of the same task race, and the
    /// later write wins.
    #[instrument(skip(self, patch), fields(task_id = %id))]
    pub fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ServiceError> {
        let current = self.get(id)?;
        let fields = merge_update(&current, patch);
        let task = self
            .store
            .update_task(id, &fields)?
            .ok_or_else(ServiceError::task_not_found)?;
        debug!(changes = task.changes.len(), "task updated");
        Ok(task)
    }
}
