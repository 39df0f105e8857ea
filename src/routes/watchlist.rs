use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::{MovieRef, WatchlistEntry},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub movie_id: String,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> AppResult<Json<Vec<WatchlistEntry>>> {
    Ok(Json(state.store.watchlist(&user.email).await?))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(movie): Json<MovieRef>,
) -> AppResult<Json<Value>> {
    if movie.movie_id.is_empty() || movie.tmdb_id.is_empty() {
        return Err(AppError::InvalidInput("Missing required fields".to_string()));
    }

    let entry = state.store.add_to_watchlist(&user.email, &movie).await?;
    tracing::info!(user = %user.email, movie_id = %entry.movie_id, "Movie added to watchlist");

    Ok(Json(json!({
        "message": "Movie added to watchlist",
        "watchlistMovie": entry,
    })))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<RemoveRequest>,
) -> AppResult<Json<Value>> {
    if request.movie_id.is_empty() {
        return Err(AppError::InvalidInput("Missing required fields".to_string()));
    }

    state
        .store
        .remove_from_watchlist(&user.email, &request.movie_id)
        .await?;

    Ok(Json(json!({ "message": "Movie removed from watchlist" })))
}
