//! Storage seams used by the services, implemented by the SQLite repositories.

use dev_memory_core::{Context, CriticalInvariant, Interaction, Invariant, Task, TaskFields, TaskId};
use dev_memory_store::{Database, InteractionRepo, InvariantRepo, StoreError, TaskRepo};

pub trait TaskStore: Send + Sync {
    fn insert_task(
        &self,
        title: &str,
        description: Option<&str>,
        context: &Context,
    ) -> Result<Task, StoreError>;

    fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError>;

    fn task_exists(&self, id: &TaskId) -> Result<bool, StoreError>;

    fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// Persist merged fields. `None` if the row vanished.
    fn update_task(&self, id: &TaskId, fields: &TaskFields) -> Result<Option<Task>, StoreError>;
}

pub trait InteractionStore: Send + Sync {
    fn append_interaction(
        &self,
        task_id: &TaskId,
        role: &str,
        content: Option<&str>,
        context: &Context,
    ) -> Result<Interaction, StoreError>;

    fn list_interactions(&self, task_id: &TaskId) -> Result<Vec<Interaction>, StoreError>;
}

pub trait InvariantStore: Send + Sync {
    fn list_active_invariants(&self) -> Result<Vec<Invariant>, StoreError>;

    fn list_critical_invariants(&self) -> Result<Vec<CriticalInvariant>, StoreError>;
}

pub trait StoreHealth: Send + Sync {
    fn ping(&self) -> Result<(), StoreError>;
}

impl TaskStore for TaskRepo {
    fn insert_task(
        &self,
        title: &str,
        description: Option<&str>,
        context: &Context,
    ) -> Result<Task, StoreError> {
        self.insert(title, description, context)
    }

    fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        self.get(id)
    }

    fn task_exists(&self, id: &TaskId) -> Result<bool, StoreError> {
        self.exists(id)
    }

    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.list()
    }

    fn update_task(&self, id: &TaskId, fields: &TaskFields) -> Result<Option<Task>, StoreError> {
        self.update(id, fields)
    }
}

impl InteractionStore for InteractionRepo {
    fn append_interaction(
        &self,
        task_id: &TaskId,
        role: &str,
        content: Option<&str>,
        context: &Context,
    ) -> Result<Interaction, StoreError> {
        self.append(task_id, role, content, context)
    }

    fn list_interactions(&self, task_id: &TaskId) -> Result<Vec<Interaction>, StoreError> {
        self.list_for_task(task_id)
    }
}

impl InvariantStore for InvariantRepo {
    fn list_active_invariants(&self) -> Result<Vec<Invariant>, StoreError> {
        self.list_active()
    }

    fn list_critical_invariants(&self) -> Result<Vec<CriticalInvariant>, StoreError> {
        self.list_critical()
    }
}

impl StoreHealth for Database {
    fn ping(&self) -> Result<(), StoreError> {
        Database::ping(self)
    }
}
