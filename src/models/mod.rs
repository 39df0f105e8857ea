use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod movie;
pub mod recommendation;

pub use movie::{Genre, Movie, TmdbMovie, TmdbPopularPage, UNAVAILABLE_TITLE};
pub use recommendation::{
    EngineStatus, FallbackReason, RecommendationSource, Recommendations, ResultNamespace,
};

/// One row of the links dataset, pairing a catalog id with a TMDB id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieLink {
    /// Dataset primary id (`movieId` column)
    pub catalog_id: String,
    /// TMDB id (`tmdbId` column)
    pub metadata_id: String,
}

impl MovieLink {
    pub fn new(catalog_id: impl Into<String>, metadata_id: impl Into<String>) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            metadata_id: metadata_id.into(),
        }
    }
}

// ============================================================================
// User Data
// ============================================================================

/// A movie saved to a user's watchlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub movie_id: String,
    pub tmdb_id: String,
    pub created_at: DateTime<Utc>,
}

/// A seed movie the user picked during onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub movie_id: String,
    pub tmdb_id: String,
    pub created_at: DateTime<Utc>,
}

/// A like or dislike recorded against a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LikedMovie {
    pub movie_id: String,
    pub tmdb_id: String,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
}

/// Movie reference sent by clients when saving user data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRef {
    pub movie_id: String,
    pub tmdb_id: String,
}
