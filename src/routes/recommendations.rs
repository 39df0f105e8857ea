use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{Movie, Recommendations},
    routes::AppState,
};

/// Fewest seed movies a user may submit
pub const MIN_SELECTED_MOVIES: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub movie_ids: Vec<String>,
}

impl RecommendationRequest {
    fn validate(&self) -> AppResult<()> {
        if self.movie_ids.len() < MIN_SELECTED_MOVIES {
            return Err(AppError::InvalidInput(format!(
                "Select at least {} movies",
                MIN_SELECTED_MOVIES
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct FallbackQuery {
    /// Comma separated TMDB ids to leave out
    #[serde(default)]
    pub exclude: Option<String>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Recommendations>> {
    request.validate()?;

    tracing::info!(
        request_id = %request_id,
        selected = request.movie_ids.len(),
        "Processing recommendation request"
    );

    let recommendations = state.recommendations.recommend(&request.movie_ids).await;

    tracing::info!(
        request_id = %request_id,
        recommendations = recommendations.movie_ids.len(),
        fallback = recommendations.is_fallback(),
        "Recommendations served"
    );

    Ok(Json(recommendations))
}

/// Recommendations hydrated with TMDB details; movies without details are dropped
pub async fn recommend_movies(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<Movie>>> {
    request.validate()?;

    let movie_ids = state
        .recommendations
        .get_movie_recommendations(&request.movie_ids)
        .await;
    let requested = movie_ids.len();

    let movies: Vec<Movie> = state
        .metadata
        .movie_details_batch(movie_ids)
        .await
        .into_iter()
        .filter(Movie::is_available)
        .collect();

    tracing::info!(
        request_id = %request_id,
        requested,
        hydrated = movies.len(),
        "Recommended movies hydrated"
    );

    Ok(Json(movies))
}

/// Static fallback picks
pub async fn fallback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FallbackQuery>,
) -> Json<Vec<String>> {
    let exclude: Vec<String> = query
        .exclude
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    Json(state.recommendations.get_fallback_recommendations(&exclude))
}
