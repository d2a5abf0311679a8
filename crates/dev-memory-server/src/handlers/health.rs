use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use crate::server::AppState;

/// GET /health. 503 when the store cannot answer `SELECT 1`.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let services = state.services.clone();
    let outcome = tokio::task::spawn_blocking(move || services.health())
        .await
        .map_err(|e| format!("worker task failed: {e}"))
        .and_then(|r| r.map_err(|e| e.to_string()));

    match outcome {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "status": "healthy" })),
        ),
        Err(error) => {
            warn!(%error, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "ok": false, "status": "unhealthy", "error": error })),
            )
        }
    }
}
