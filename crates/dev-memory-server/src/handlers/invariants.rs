use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::blocking;
use crate::error::ApiError;
use crate::server::AppState;

/// GET /invariants
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let invariants = state.services.invariants.clone();
    let active = blocking(move || invariants.list_active()).await?;
    Ok(Json(json!({ "ok": true, "invariants": active })))
}

/// GET /invariants/check
pub async fn check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let invariants = state.services.invariants.clone();
    let check = blocking(move || invariants.check_critical()).await?;
    Ok(Json(json!({
        "ok": true,
        "count": check.count,
        "invariants": check.invariants,
        "message": check.message,
    })))
}
