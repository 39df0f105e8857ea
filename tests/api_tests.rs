use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Utc;
use mockall::mock;
use serde_json::{json, Value};

use reelmatch_api::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{
        EngineStatus, LikedMovie, Movie, MovieLink, MovieRef, Preference, ResultNamespace,
        WatchlistEntry,
    },
    routes::{create_router, AppState},
    services::{
        fallback::POPULAR_MOVIE_IDS,
        providers::{MetadataProvider, RecommendationEngine},
        FallbackSelector, MovieLinkService, RecommendationClient,
    },
};

mock! {
    pub Engine {}

    #[async_trait::async_trait]
    impl RecommendationEngine for Engine {
        async fn recommend(&self, catalog_ids: &[String]) -> AppResult<Value>;
        async fn health_check(&self) -> EngineStatus;
    }
}

/// Catalog that knows a fixed set of movies
#[derive(Clone, Default)]
struct StaticCatalog {
    movies: HashMap<String, Movie>,
}

impl StaticCatalog {
    fn with_titles(titles: &[(&str, &str)]) -> Self {
        let movies = titles
            .iter()
            .map(|(id, title)| {
                let mut movie = Movie::unavailable(*id);
                movie.title = title.to_string();
                (id.to_string(), movie)
            })
            .collect();
        Self { movies }
    }
}

#[async_trait::async_trait]
impl MetadataProvider for StaticCatalog {
    async fn movie_details(&self, tmdb_id: &str) -> Movie {
        self.movies
            .get(tmdb_id)
            .cloned()
            .unwrap_or_else(|| Movie::unavailable(tmdb_id))
    }

    async fn popular_movies(&self) -> Vec<Movie> {
        let mut movies: Vec<Movie> = self.movies.values().cloned().collect();
        movies.sort_by(|a, b| a.id.cmp(&b.id));
        movies
    }

    fn clone_for_task(&self) -> Box<dyn MetadataProvider> {
        Box::new(self.clone())
    }
}

/// User store kept in memory
#[derive(Default)]
struct MemoryStore {
    watchlists: Mutex<HashMap<String, Vec<WatchlistEntry>>>,
    preferences: Mutex<HashMap<String, Vec<Preference>>>,
    likes: Mutex<HashMap<(String, String), LikedMovie>>,
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn watchlist(&self, user_email: &str) -> AppResult<Vec<WatchlistEntry>> {
        let watchlists = self.watchlists.lock().unwrap();
        Ok(watchlists.get(user_email).cloned().unwrap_or_default())
    }

    async fn add_to_watchlist(
        &self,
        user_email: &str,
        movie: &MovieRef,
    ) -> AppResult<WatchlistEntry> {
        let mut watchlists = self.watchlists.lock().unwrap();
        let entries = watchlists.entry(user_email.to_string()).or_default();
        if entries.iter().any(|e| e.movie_id == movie.movie_id) {
            return Err(AppError::Conflict("Movie already in watchlist".to_string()));
        }
        let entry = WatchlistEntry {
            movie_id: movie.movie_id.clone(),
            tmdb_id: movie.tmdb_id.clone(),
            created_at: Utc::now(),
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn remove_from_watchlist(&self, user_email: &str, movie_id: &str) -> AppResult<()> {
        let mut watchlists = self.watchlists.lock().unwrap();
        let entries = watchlists.entry(user_email.to_string()).or_default();
        let before = entries.len();
        entries.retain(|e| e.movie_id != movie_id);
        if entries.len() == before {
            return Err(AppError::NotFound("Movie not in watchlist".to_string()));
        }
        Ok(())
    }

    async fn preferences(&self, user_email: &str) -> AppResult<Vec<Preference>> {
        let preferences = self.preferences.lock().unwrap();
        Ok(preferences.get(user_email).cloned().unwrap_or_default())
    }

    async fn replace_preferences(
        &self,
        user_email: &str,
        movies: &[MovieRef],
    ) -> AppResult<Vec<Preference>> {
        let saved: Vec<Preference> = movies
            .iter()
            .map(|m| Preference {
                movie_id: m.movie_id.clone(),
                tmdb_id: m.tmdb_id.clone(),
                created_at: Utc::now(),
            })
            .collect();
        self.preferences
            .lock()
            .unwrap()
            .insert(user_email.to_string(), saved.clone());
        Ok(saved)
    }

    async fn set_liked(
        &self,
        user_email: &str,
        movie: &MovieRef,
        is_liked: bool,
    ) -> AppResult<LikedMovie> {
        let liked = LikedMovie {
            movie_id: movie.movie_id.clone(),
            tmdb_id: movie.tmdb_id.clone(),
            is_liked,
            created_at: Utc::now(),
        };
        self.likes
            .lock()
            .unwrap()
            .insert((user_email.to_string(), movie.movie_id.clone()), liked.clone());
        Ok(liked)
    }
}

fn links() -> Vec<MovieLink> {
    vec![
        MovieLink::new("1", "862"),
        MovieLink::new("2", "8844"),
        MovieLink::new("3", "15602"),
        MovieLink::new("4", "31357"),
        MovieLink::new("5", "11862"),
    ]
}

fn seeds() -> Value {
    json!({ "movieIds": ["862", "8844", "15602", "31357", "11862"] })
}

fn create_test_server(engine: MockEngine, links: Vec<MovieLink>) -> TestServer {
    let engine: Arc<dyn RecommendationEngine> = Arc::new(engine);
    let recommendations = Arc::new(RecommendationClient::new(
        Arc::new(MovieLinkService::with_links(links)),
        engine.clone(),
        FallbackSelector::seeded(11),
        ResultNamespace::Auto,
    ));

    let state = Arc::new(AppState {
        recommendations,
        engine,
        metadata: Arc::new(StaticCatalog::with_titles(&[
            ("597", "Titanic"),
            ("120", "The Lord of the Rings: The Fellowship of the Ring"),
            ("1726", "Iron Man"),
        ])),
        store: Arc::new(MemoryStore::default()),
    });

    TestServer::new(create_router(state)).unwrap()
}

fn user_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-email"),
        HeaderValue::from_static("demo@example.com"),
    )
}

fn assert_pool_ids(ids: &[Value]) {
    for id in ids {
        assert!(POPULAR_MOVIE_IDS.contains(&id.as_str().unwrap()));
    }
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(MockEngine::new(), links());
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_status_reports_engine_reachability() {
    let mut engine = MockEngine::new();
    engine
        .expect_health_check()
        .times(1)
        .returning(|| EngineStatus::Offline);
    let server = create_test_server(engine, links());

    let response = server.get("/api/v1/status").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "offline" }));

    let mut engine = MockEngine::new();
    engine
        .expect_health_check()
        .returning(|| EngineStatus::Online);
    let server = create_test_server(engine, links());

    let status: Value = server.get("/api/v1/status").await.json();
    assert_eq!(status["status"], "online");
}

#[tokio::test]
async fn test_recommendations_require_five_movies() {
    let mut engine = MockEngine::new();
    engine.expect_recommend().never();
    let server = create_test_server(engine, links());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "movieIds": ["862", "8844"] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_personalized() {
    let mut engine = MockEngine::new();
    engine
        .expect_recommend()
        .times(1)
        .returning(|_| Ok(json!(["597", "120"])));
    let server = create_test_server(engine, links());

    let response = server.post("/api/v1/recommendations").json(&seeds()).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["source"], "personalized");
    assert_eq!(body["movieIds"], json!(["597", "120"]));
}

#[tokio::test]
async fn test_recommendations_fall_back_when_engine_fails() {
    let mut engine = MockEngine::new();
    engine
        .expect_recommend()
        .returning(|_| Err(AppError::ExternalApi("status 503".to_string())));
    let server = create_test_server(engine, links());

    let selected = json!({ "movieIds": ["862", "8844", "15602", "299534", "1726"] });
    let response = server.post("/api/v1/recommendations").json(&selected).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["source"], "fallback");
    let ids = body["movieIds"].as_array().unwrap();
    assert_eq!(ids.len(), 10);
    assert_pool_ids(ids);
    assert!(!ids.contains(&json!("299534")));
    assert!(!ids.contains(&json!("1726")));
}

#[tokio::test]
async fn test_recommendations_fall_back_when_nothing_maps() {
    let mut engine = MockEngine::new();
    engine.expect_recommend().never();
    let server = create_test_server(engine, Vec::new());

    let selected = json!({ "movieIds": ["unknown1", "unknown2", "unknown3", "unknown4", "unknown5"] });
    let body: Value = server
        .post("/api/v1/recommendations")
        .json(&selected)
        .await
        .json();

    assert_eq!(body["source"], "fallback");
    assert_eq!(body["movieIds"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_recommended_movies_are_hydrated() {
    let mut engine = MockEngine::new();
    engine
        .expect_recommend()
        .returning(|_| Ok(json!(["597", "404404", "120"])));
    let server = create_test_server(engine, links());

    let response = server
        .post("/api/v1/recommendations/movies")
        .json(&seeds())
        .await;
    response.assert_status_ok();

    let movies: Vec<Movie> = response.json();
    let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Titanic", "The Lord of the Rings: The Fellowship of the Ring"]
    );
}

#[tokio::test]
async fn test_fallback_endpoint_excludes_ids() {
    let server = create_test_server(MockEngine::new(), links());

    let response = server
        .get("/api/v1/recommendations/fallback")
        .add_query_param("exclude", "299534, 1726,")
        .await;
    response.assert_status_ok();

    let ids: Vec<String> = response.json();
    assert_eq!(ids.len(), 10);
    assert!(!ids.contains(&"299534".to_string()));
    assert!(!ids.contains(&"1726".to_string()));

    let ids: Vec<String> = server.get("/api/v1/recommendations/fallback").await.json();
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn test_movie_catalog_routes() {
    let server = create_test_server(MockEngine::new(), links());

    let popular: Vec<Movie> = server.get("/api/v1/movies/popular").await.json();
    assert_eq!(popular.len(), 3);

    let response = server.get("/api/v1/movies/597").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Movie>().title, "Titanic");

    server
        .get("/api/v1/movies/404404")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_routes_require_identity() {
    let server = create_test_server(MockEngine::new(), links());

    server
        .get("/api/v1/watchlist")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/v1/movies/like")
        .json(&json!({ "movieId": "1", "tmdbId": "862", "isLiked": true }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_watchlist_flow() {
    let server = create_test_server(MockEngine::new(), links());
    let (name, value) = user_header();
    let movie = json!({ "movieId": "1", "tmdbId": "862" });

    let response = server
        .post("/api/v1/watchlist/add")
        .add_header(name.clone(), value.clone())
        .json(&movie)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["watchlistMovie"]["tmdbId"], "862");

    server
        .post("/api/v1/watchlist/add")
        .add_header(name.clone(), value.clone())
        .json(&movie)
        .await
        .assert_status(StatusCode::CONFLICT);

    let entries: Vec<Value> = server
        .get("/api/v1/watchlist")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(entries.len(), 1);

    server
        .post("/api/v1/watchlist/remove")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "movieId": "1" }))
        .await
        .assert_status_ok();

    server
        .post("/api/v1/watchlist/remove")
        .add_header(name, value)
        .json(&json!({ "movieId": "1" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preferences_flow() {
    let server = create_test_server(MockEngine::new(), links());
    let (name, value) = user_header();

    server
        .post("/api/v1/preferences")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "movieIds": [] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/v1/preferences")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "movieIds": [
            { "movieId": "1", "tmdbId": "862" },
            { "movieId": "2", "tmdbId": "8844" }
        ] }))
        .await
        .assert_status_ok();

    let preferences: Vec<Value> = server
        .get("/api/v1/preferences")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(preferences.len(), 2);
    assert_eq!(preferences[1]["tmdbId"], "8844");
}

#[tokio::test]
async fn test_like_movie() {
    let server = create_test_server(MockEngine::new(), links());
    let (name, value) = user_header();

    let response = server
        .post("/api/v1/movies/like")
        .add_header(name, value)
        .json(&json!({ "movieId": "1", "tmdbId": "862", "isLiked": false }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["likedMovie"]["isLiked"], false);
}
