use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use dev_memory_core::AppendInteractionRequest;

use super::blocking;
use crate::error::ApiError;
use crate::extract::{JsonBody, TaskIdPath};
use crate::server::AppState;

/// POST /dev-memory/tasks/{id}/interactions
pub async fn append(
    State(state): State<AppState>,
    TaskIdPath(task_id): TaskIdPath,
    JsonBody(req): JsonBody<AppendInteractionRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let interactions = state.services.interactions.clone();
    let interaction = blocking(move || interactions.append(&task_id, req)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "interaction": interaction })),
    ))
}

/// GET /dev-memory/tasks/{id}/interactions
pub async fn list(
    State(state): State<AppState>,
    TaskIdPath(task_id): TaskIdPath,
) -> Result<Json<Value>, ApiError> {
    let interactions = state.services.interactions.clone();
    let all = blocking(move || interactions.list(&task_id)).await?;
    Ok(Json(json!({ "ok": true, "interactions": all })))
}
