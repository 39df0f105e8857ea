use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::{Movie, MovieRef},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub movie_id: String,
    pub tmdb_id: String,
    pub is_liked: bool,
}

/// Popular movies for the selection screen
pub async fn popular(State(state): State<Arc<AppState>>) -> Json<Vec<Movie>> {
    Json(state.metadata.popular_movies().await)
}

/// Movie details by TMDB id
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(tmdb_id): Path<String>,
) -> AppResult<Json<Movie>> {
    let movie = state.metadata.movie_details(&tmdb_id).await;
    if !movie.is_available() {
        return Err(AppError::NotFound(format!("Movie {} not found", tmdb_id)));
    }
    Ok(Json(movie))
}

/// Records a like or dislike
pub async fn like(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<LikeRequest>,
) -> AppResult<Json<Value>> {
    if request.movie_id.is_empty() || request.tmdb_id.is_empty() {
        return Err(AppError::InvalidInput("Missing required fields".to_string()));
    }

    let movie = MovieRef {
        movie_id: request.movie_id,
        tmdb_id: request.tmdb_id,
    };
    let liked = state
        .store
        .set_liked(&user.email, &movie, request.is_liked)
        .await?;

    Ok(Json(json!({
        "message": "Movie preference saved",
        "likedMovie": liked,
    })))
}
