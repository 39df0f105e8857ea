use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reelmatch_api::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgUserStore},
    routes::{create_router, AppState},
    services::{
        providers::{HttpRecommendationEngine, TmdbProvider},
        FallbackSelector, HttpLinkSource, MovieLinkService, RecommendationClient,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelmatch_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db_pool = create_pool(&config.database_url)
        .await
        .context("Connecting to Postgres")?;
    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client);

    let link_source = HttpLinkSource::new(config.links_dataset_url.clone(), config.request_timeout())?;
    let links = Arc::new(MovieLinkService::new(Arc::new(link_source)));

    let engine = Arc::new(HttpRecommendationEngine::new(
        config.recommender_url.clone(),
        config.request_timeout(),
        config.health_check_timeout(),
    )?);

    let fallback = match config.fallback_seed {
        Some(seed) => FallbackSelector::seeded(seed),
        None => FallbackSelector::new(),
    };

    let recommendations = Arc::new(RecommendationClient::new(
        links,
        engine.clone(),
        fallback,
        config.result_namespace,
    ));

    let state = Arc::new(AppState {
        recommendations,
        engine,
        metadata: Arc::new(TmdbProvider::new(
            cache,
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.request_timeout(),
        )?),
        store: Arc::new(PgUserStore::new(db_pool)),
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Binding {}", addr))?;

    tracing::info!(
        address = %addr,
        recommender = %config.recommender_url,
        namespace = ?config.result_namespace,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    cache_handle.shutdown().await;

    Ok(())
}
