use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use dev_memory_core::{CreateTaskRequest, TaskPatch};

use super::blocking;
use crate::error::ApiError;
use crate::extract::{JsonBody, TaskIdPath};
use crate::server::AppState;

/// POST /dev-memory/tasks
pub async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let tasks = state.services.tasks.clone();
    let task = blocking(move || tasks.create(req)).await?;
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "task": task }))))
}

/// GET /dev-memory/tasks
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let tasks = state.services.tasks.clone();
    let all = blocking(move || tasks.list()).await?;
    Ok(Json(json!({ "ok": true, "tasks": all })))
}

/// GET /dev-memory/tasks/{id}
pub async fn get(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
) -> Result<Json<Value>, ApiError> {
    let tasks = state.services.tasks.clone();
    let task = blocking(move || tasks.get(&id)).await?;
    Ok(Json(json!({ "ok": true, "task": task })))
}

/// PATCH /dev-memory/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
    JsonBody(patch): JsonBody<TaskPatch>,
) -> Result<Json<Value>, ApiError> {
    let tasks = state.services.tasks.clone();
    let task = blocking(move || tasks.update(&id, &patch)).await?;
    Ok(Json(json!({ "ok": true, "task": task })))
}
