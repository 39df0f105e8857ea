use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::routes::AppState;

/// Reports whether the recommendation engine is reachable
///
/// Informational only: recommendation requests degrade on their own
/// regardless of what this reports.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let status = state.engine.health_check().await;
    Json(json!({ "status": status }))
}
