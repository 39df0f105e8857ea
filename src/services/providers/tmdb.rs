/// TMDB metadata provider
///
/// Resolves TMDB ids into displayable movies and lists popular titles.
/// Results are cached in Redis. Lookups that fail degrade to a placeholder
/// movie (details) or an empty list (popular) instead of erroring.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Movie, TmdbMovie, TmdbPopularPage},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const MOVIE_CACHE_TTL: u64 = 86400; // 1 day
const POPULAR_CACHE_TTL: u64 = 3600; // 1 hour
const POPULAR_LIMIT: usize = 35;
const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(
        cache: Cache,
        api_key: String,
        api_url: String,
        request_timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(request_timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            cache,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", LANGUAGE)])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {} for {}",
                status, path
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_movie(&self, tmdb_id: &str) -> AppResult<Movie> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(tmdb_id.to_string()),
            MOVIE_CACHE_TTL,
            async move {
                let movie: TmdbMovie = self.get_json(&format!("/movie/{}", tmdb_id), &[]).await?;
                AppResult::Ok(Movie::from(movie))
            }
        )
    }

    async fn fetch_popular(&self) -> AppResult<Vec<Movie>> {
        cached!(
            self.cache,
            CacheKey::PopularMovies,
            POPULAR_CACHE_TTL,
            async move {
                let (page1, page2) = tokio::try_join!(
                    self.get_json::<TmdbPopularPage>("/movie/popular", &[("page", "1")]),
                    self.get_json::<TmdbPopularPage>("/movie/popular", &[("page", "2")]),
                )?;

                let movies = merge_popular_pages(page1, page2);
                tracing::info!(movies = movies.len(), provider = "tmdb", "Popular movies fetched");

                AppResult::Ok(movies)
            }
        )
    }
}

/// Concatenates popular pages and keeps the first `POPULAR_LIMIT` movies
fn merge_popular_pages(page1: TmdbPopularPage, page2: TmdbPopularPage) -> Vec<Movie> {
    page1
        .results
        .into_iter()
        .chain(page2.results)
        .take(POPULAR_LIMIT)
        .map(Movie::from)
        .collect()
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn movie_details(&self, tmdb_id: &str) -> Movie {
        match self.fetch_movie(tmdb_id).await {
            Ok(movie) => movie,
            Err(e) => {
                tracing::error!(tmdb_id = %tmdb_id, error = %e, "Failed to fetch movie details");
                Movie::unavailable(tmdb_id)
            }
        }
    }

    async fn popular_movies(&self) -> Vec<Movie> {
        match self.fetch_popular().await {
            Ok(movies) => movies,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch popular movies");
                Vec::new()
            }
        }
    }

    fn clone_for_task(&self) -> Box<dyn MetadataProvider> {
        Box::new(self.clone())
    }
}
