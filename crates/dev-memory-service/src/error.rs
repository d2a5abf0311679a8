use dev_memory_store::StoreError;

/// Failure of a service operation. The message is what callers see.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or empty required input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn task_not_found() -> Self {
        Self::NotFound("task not found".into())
    }
}
