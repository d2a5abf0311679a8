//! Route handlers. Service calls are synchronous, so each one runs on the
//! blocking pool.

pub mod health;
pub mod interactions;
pub mod invariants;
pub mod tasks;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use dev_memory_service::ServiceError;

use crate::error::ApiError;

/// Run a service call on the blocking pool and convert its error.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
        .map_err(ApiError::from)
}

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "ok": false, "error": "route not found" })),
    )
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "ok": false, "error": "method not allowed" })),
    )
}
