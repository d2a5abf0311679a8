use std::sync::Arc;

use tracing::instrument;

use dev_memory_core::{AppendInteractionRequest, Interaction, TaskId};

use crate::error::ServiceError;
use crate::store::{InteractionStore, TaskStore};

#[derive(Clone)]
pub struct InteractionService {
    tasks: Arc<dyn TaskStore>,
    store: Arc<dyn InteractionStore>,
}

impl InteractionService {
    pub fn new(tasks: Arc<dyn TaskStore>, store: Arc<dyn InteractionStore>) -> Self {
        Self { tasks, store }
    }

    /// Record an exchange against an existing task.
    #[instrument(skip(self, req), fields(task_id = %task_id))]
    pub fn append(
        &self,
        task_id: &TaskId,
        req: AppendInteractionRequest,
    ) -> Result<Interaction, ServiceError> {
        let role = req
            .role
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ServiceError::validation("role is required"))?;

        if !self.tasks.task_exists(task_id)? {
            return Err(ServiceError::task_not_found());
        }

        let content = req.content.filter(|c| !c.is_empty());
        let context = req.context.unwrap_or_default();
        Ok(self
            .store
            .append_interaction(task_id, &role, content.as_deref(), &context)?)
    }

    /// Oldest first. An unknown task simply has no interactions.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub fn list(&self, task_id: &TaskId) -> Result<Vec<Interaction>, ServiceError> {
        Ok(self.store.list_interactions(task_id)?)
    }
}
