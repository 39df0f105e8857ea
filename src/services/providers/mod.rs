/// External collaborators behind the recommendation pipeline
///
/// The recommendation engine answers with candidate ids for a set of seed
/// movies. The metadata provider (TMDB) turns ids into displayable movies.
/// Both are traits so the pipeline and the routes can run against doubles.
use crate::{
    error::AppResult,
    models::{EngineStatus, Movie},
};

pub mod recommender;
pub mod tmdb;

pub use recommender::HttpRecommendationEngine;
pub use tmdb::TmdbProvider;

/// Remote recommendation engine
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationEngine: Send + Sync {
    /// Ask for recommendations seeded by catalog ids
    ///
    /// Any non-success status, network error or timeout comes back as `Err`.
    /// The payload is returned as received; callers validate its shape.
    async fn recommend(&self, catalog_ids: &[String]) -> AppResult<serde_json::Value>;

    /// Probe the engine endpoint under a short timeout. Never fails.
    async fn health_check(&self) -> EngineStatus;
}

/// Movie metadata source
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Movie details by TMDB id, or a placeholder when unavailable
    async fn movie_details(&self, tmdb_id: &str) -> Movie;

    /// Current popular movies, empty when unavailable
    async fn popular_movies(&self) -> Vec<Movie>;

    /// Details for several ids in parallel, keeping input order
    async fn movie_details_batch(&self, tmdb_ids: Vec<String>) -> Vec<Movie> {
        let mut tasks = Vec::new();

        for tmdb_id in tmdb_ids {
            let provider = self.clone_for_task();
            let task = tokio::spawn(async move { provider.movie_details(&tmdb_id).await });
            tasks.push(task);
        }

        let mut movies = Vec::new();
        for task in tasks {
            match task.await {
                Ok(movie) => movies.push(movie),
                Err(e) => tracing::error!(error = %e, "Task join error"),
            }
        }

        movies
    }

    /// Clone provider for parallel task execution
    fn clone_for_task(&self) -> Box<dyn MetadataProvider>;
}
