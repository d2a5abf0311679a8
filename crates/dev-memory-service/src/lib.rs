//! Task lifecycle, interaction log and invariant registry services.
//!
//! Services validate input, apply the merge engine and map missing rows to
//! [`ServiceError::NotFound`]. They talk to storage only through the traits
//! in [`store`], so tests can swap in a substitute backend.

pub mod error;
pub mod interactions;
pub mod invariants;
pub mod store;
pub mod tasks;

use std::sync::Arc;

use dev_memory_store::{Database, InteractionRepo, InvariantRepo, StoreError, TaskRepo};

pub use error::ServiceError;
pub use interactions::InteractionService;
pub use invariants::InvariantService;
pub use store::{InteractionStore, InvariantStore, StoreHealth, TaskStore};
pub use tasks::TaskService;

/// Every service the front door needs, sharing one pool.
#[derive(Clone)]
pub struct Services {
    pub tasks: TaskService,
    pub interactions: InteractionService,
    pub invariants: InvariantService,
    store: Arc<dyn StoreHealth>,
}

impl Services {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        interactions: Arc<dyn InteractionStore>,
        invariants: Arc<dyn InvariantStore>,
        store: Arc<dyn StoreHealth>,
    ) -> Self {
        Self {
            tasks: TaskService::new(Arc::clone(&tasks)),
            interactions: InteractionService::new(tasks, interactions),
            invariants: InvariantService::new(invariants),
            store,
        }
    }

    pub fn from_database(db: Database) -> Self {
        Self::new(
            Arc::new(TaskRepo::new(db.clone())),
            Arc::new(InteractionRepo::new(db.clone())),
            Arc::new(InvariantRepo::new(db.clone())),
            Arc::new(db),
        )
    }

    /// Round-trip a trivial query through the store.
    pub fn health(&self) -> Result<(), StoreError> {
        self.store.ping()
    }
}
