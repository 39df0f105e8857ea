use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    db::UserStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{
        providers::{MetadataProvider, RecommendationEngine},
        RecommendationClient,
    },
};

pub mod movies;
pub mod preferences;
pub mod recommendations;
pub mod status;
pub mod watchlist;

/// Shared state handed to every handler
pub struct AppState {
    pub recommendations: Arc<RecommendationClient>,
    pub engine: Arc<dyn RecommendationEngine>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub store: Arc<dyn UserStore>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(status::status))
        // Recommendations
        .route("/recommendations", post(recommendations::recommend))
        .route("/recommendations/movies", post(recommendations::recommend_movies))
        .route("/recommendations/fallback", get(recommendations::fallback))
        // Catalog
        .route("/movies/popular", get(movies::popular))
        .route("/movies/like", post(movies::like))
        .route("/movies/:id", get(movies::details))
        // User data
        .route("/watchlist", get(watchlist::list))
        .route("/watchlist/add", post(watchlist::add))
        .route("/watchlist/remove", post(watchlist::remove))
        .route("/preferences", get(preferences::list).post(preferences::save))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
