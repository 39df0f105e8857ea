use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::{MovieRef, Preference},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePreferencesRequest {
    #[serde(default)]
    pub movie_ids: Vec<MovieRef>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Preference>>> {
    Ok(Json(state.store.preferences(&user.email).await?))
}

/// Replaces the user's saved seed movies
pub async fn save(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<SavePreferencesRequest>,
) -> AppResult<Json<Value>> {
    if request.movie_ids.is_empty() {
        return Err(AppError::InvalidInput(
            "Missing or invalid movieIds".to_string(),
        ));
    }

    let preferences = state
        .store
        .replace_preferences(&user.email, &request.movie_ids)
        .await?;

    Ok(Json(json!({
        "message": "Preferences saved",
        "preferences": preferences,
    })))
}
