use std::sync::Arc;

use tracing::instrument;

use dev_memory_core::{Invariant, InvariantCheck};

use crate::error::ServiceError;
use crate::store::InvariantStore;

/// Read-only view of the invariant registry.
#[derive(Clone)]
pub struct InvariantService {
    store: Arc<dyn InvariantStore>,
}

impl InvariantService {
    pub fn new(store: Arc<dyn InvariantStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub fn list_active(&self) -> Result<Vec<Invariant>, ServiceError> {
        Ok(self.store.list_active_invariants()?)
    }

    /// The active critical invariants a caller must respect before mutating.
    /// Advisory only: nothing is blocked here.
    #[instrument(skip(self))]
    pub fn check_critical(&self) -> Result<InvariantCheck, ServiceError> {
        let critical = self.store.list_critical_invariants()?;
        Ok(InvariantCheck::new(critical))
    }
}
