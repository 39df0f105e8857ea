//! Per-user movie data: watchlist, onboarding preferences and likes
//!
//! Every row is keyed by the user's email and the catalog movie id.
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{LikedMovie, MovieRef, Preference, WatchlistEntry},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn watchlist(&self, user_email: &str) -> AppResult<Vec<WatchlistEntry>>;

    /// Fails with `Conflict` when the movie is already listed
    async fn add_to_watchlist(&self, user_email: &str, movie: &MovieRef)
        -> AppResult<WatchlistEntry>;

    /// Fails with `NotFound` when the movie is not listed
    async fn remove_from_watchlist(&self, user_email: &str, movie_id: &str) -> AppResult<()>;

    async fn preferences(&self, user_email: &str) -> AppResult<Vec<Preference>>;

    /// Replaces all of the user's preferences
    async fn replace_preferences(
        &self,
        user_email: &str,
        movies: &[MovieRef],
    ) -> AppResult<Vec<Preference>>;

    /// Records a like or dislike, overwriting any earlier one
    async fn set_liked(
        &self,
        user_email: &str,
        movie: &MovieRef,
        is_liked: bool,
    ) -> AppResult<LikedMovie>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn watchlist(&self, user_email: &str) -> AppResult<Vec<WatchlistEntry>> {
        let entries = sqlx::query_as::<_, WatchlistEntry>(
            r#"
            SELECT movie_id, tmdb_id, created_at
            FROM watchlist_movies
            WHERE user_email = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn add_to_watchlist(
        &self,
        user_email: &str,
        movie: &MovieRef,
    ) -> AppResult<WatchlistEntry> {
        let entry = sqlx::query_as::<_, WatchlistEntry>(
            r#"
            INSERT INTO watchlist_movies (user_email, movie_id, tmdb_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_email, movie_id) DO NOTHING
            RETURNING movie_id, tmdb_id, created_at
            "#,
        )
        .bind(user_email)
        .bind(&movie.movie_id)
        .bind(&movie.tmdb_id)
        .fetch_optional(&self.pool)
        .await?;

        entry.ok_or_else(|| AppError::Conflict("Movie already in watchlist".to_string()))
    }

    async fn remove_from_watchlist(&self, user_email: &str, movie_id: &str) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM watchlist_movies WHERE user_email = $1 AND movie_id = $2")
                .bind(user_email)
                .bind(movie_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Movie not in watchlist".to_string()));
        }

        Ok(())
    }

    async fn preferences(&self, user_email: &str) -> AppResult<Vec<Preference>> {
        let preferences = sqlx::query_as::<_, Preference>(
            r#"
            SELECT movie_id, tmdb_id, created_at
            FROM preferences
            WHERE user_email = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(preferences)
    }

    async fn replace_preferences(
        &self,
        user_email: &str,
        movies: &[MovieRef],
    ) -> AppResult<Vec<Preference>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM preferences WHERE user_email = $1")
            .bind(user_email)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(movies.len());
        for movie in movies {
            let preference = sqlx::query_as::<_, Preference>(
                r#"
                INSERT INTO preferences (user_email, movie_id, tmdb_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_email, movie_id) DO UPDATE SET tmdb_id = EXCLUDED.tmdb_id
                RETURNING movie_id, tmdb_id, created_at
                "#,
            )
            .bind(user_email)
            .bind(&movie.movie_id)
            .bind(&movie.tmdb_id)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(preference);
        }

        tx.commit().await?;

        tracing::info!(user = %user_email, count = saved.len(), "Preferences replaced");

        Ok(saved)
    }

    async fn set_liked(
        &self,
        user_email: &str,
        movie: &MovieRef,
        is_liked: bool,
    ) -> AppResult<LikedMovie> {
        let liked = sqlx::query_as::<_, LikedMovie>(
            r#"
            INSERT INTO liked_movies (user_email, movie_id, tmdb_id, is_liked)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_email, movie_id)
            DO UPDATE SET is_liked = EXCLUDED.is_liked, tmdb_id = EXCLUDED.tmdb_id
            RETURNING movie_id, tmdb_id, is_liked, created_at
            "#,
        )
        .bind(user_email)
        .bind(&movie.movie_id)
        .bind(&movie.tmdb_id)
        .bind(is_liked)
        .fetch_one(&self.pool)
        .await?;

        Ok(liked)
    }
}
