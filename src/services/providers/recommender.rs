/// HTTP client for the recommendation engine
///
/// API Flow:
/// 1. Recommend: POST {endpoint} with `{"movieIds": [...]}` → JSON array
/// 2. Health: HEAD {endpoint} under a short timeout → 2xx means online
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::EngineStatus,
    services::providers::RecommendationEngine,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendRequest<'a> {
    movie_ids: &'a [String],
}

#[derive(Clone)]
pub struct HttpRecommendationEngine {
    http_client: HttpClient,
    endpoint: String,
    health_check_timeout: Duration,
}

impl HttpRecommendationEngine {
    pub fn new(
        endpoint: String,
        request_timeout: Duration,
        health_check_timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(request_timeout).build()?;

        Ok(Self {
            http_client,
            endpoint,
            health_check_timeout,
        })
    }
}

#[async_trait::async_trait]
impl RecommendationEngine for HttpRecommendationEngine {
    async fn recommend(&self, catalog_ids: &[String]) -> AppResult<serde_json::Value> {
        tracing::debug!(
            seeds = catalog_ids.len(),
            endpoint = %self.endpoint,
            "Requesting recommendations from engine"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&RecommendRequest {
                movie_ids: catalog_ids,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Recommendation engine request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Recommendation engine returned status {}",
                status
            )));
        }

        Ok(response.json().await?)
    }

    async fn health_check(&self) -> EngineStatus {
        // Dropping the send future on timeout aborts the request
        let probe = self.http_client.head(&self.endpoint).send();

        match tokio::time::timeout(self.health_check_timeout, probe).await {
            Ok(Ok(response)) if response.status().is_success() => EngineStatus::Online,
            Ok(Ok(response)) => {
                tracing::debug!(status = %response.status(), "Engine health check rejected");
                EngineStatus::Offline
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Engine health check failed");
                EngineStatus::Offline
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.health_check_timeout.as_millis() as u64,
                    "Engine health check timed out"
                );
                EngineStatus::Offline
            }
        }
    }
}
