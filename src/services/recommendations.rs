use std::sync::Arc;

use serde_json::Value;

use crate::{
    models::{FallbackReason, Recommendations, ResultNamespace},
    services::{
        fallback::FallbackSelector, links::MovieLinkService, providers::RecommendationEngine,
    },
};

/// Result of one engine round trip
#[derive(Debug, PartialEq, Eq)]
enum EngineOutcome {
    Ids(Vec<String>),
    Unavailable,
    Malformed,
}

/// Turns selected TMDB ids into recommended TMDB ids
///
/// Each pass maps the seeds to catalog ids, asks the engine, and maps the
/// answer back. Any failing step ends the pass on the fallback pool, so
/// callers always receive a usable list and never an error.
pub struct RecommendationClient {
    links: Arc<MovieLinkService>,
    engine: Arc<dyn RecommendationEngine>,
    fallback: FallbackSelector,
    namespace: ResultNamespace,
}

impl RecommendationClient {
    pub fn new(
        links: Arc<MovieLinkService>,
        engine: Arc<dyn RecommendationEngine>,
        fallback: FallbackSelector,
        namespace: ResultNamespace,
    ) -> Self {
        Self {
            links,
            engine,
            fallback,
            namespace,
        }
    }

    /// Recommended TMDB ids for the selection; never fails
    pub async fn get_movie_recommendations(&self, selected_ids: &[String]) -> Vec<String> {
        self.recommend(selected_ids).await.movie_ids
    }

    /// Fallback picks excluding `exclude_ids`; pure apart from randomness
    pub fn get_fallback_recommendations(&self, exclude_ids: &[String]) -> Vec<String> {
        self.fallback.select(exclude_ids)
    }

    /// Runs one pipeline pass and reports which source produced the result
    pub async fn recommend(&self, selected_ids: &[String]) -> Recommendations {
        let catalog_ids = self.links.to_catalog_ids(selected_ids).await;
        if catalog_ids.is_empty() {
            return self.degrade(selected_ids, FallbackReason::NoMappedSeeds);
        }

        tracing::debug!(
            selected = selected_ids.len(),
            mapped = catalog_ids.len(),
            "Seed movies mapped to catalog ids"
        );

        let result_ids = match self.call_engine(&catalog_ids).await {
            EngineOutcome::Ids(ids) => ids,
            EngineOutcome::Unavailable => {
                return self.degrade(selected_ids, FallbackReason::EngineUnavailable)
            }
            EngineOutcome::Malformed => {
                return self.degrade(selected_ids, FallbackReason::MalformedPayload)
            }
        };

        let movie_ids = self.resolve_namespace(result_ids).await;
        if movie_ids.is_empty() {
            return self.degrade(selected_ids, FallbackReason::NoMappedResults);
        }

        tracing::info!(
            recommendations = movie_ids.len(),
            "Personalized recommendations ready"
        );

        Recommendations::personalized(movie_ids)
    }

    async fn call_engine(&self, catalog_ids: &[String]) -> EngineOutcome {
        match self.engine.recommend(catalog_ids).await {
            Ok(payload) => match parse_engine_payload(&payload) {
                Some(ids) => EngineOutcome::Ids(ids),
                None => {
                    tracing::warn!(payload = %payload, "Unexpected recommendation payload");
                    EngineOutcome::Malformed
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Recommendation engine call failed");
                EngineOutcome::Unavailable
            }
        }
    }

    async fn resolve_namespace(&self, result_ids: Vec<String>) -> Vec<String> {
        let already_metadata = match self.namespace {
            ResultNamespace::Metadata => true,
            ResultNamespace::Catalog => false,
            ResultNamespace::Auto => looks_like_metadata_ids(&result_ids),
        };

        if already_metadata {
            result_ids
        } else {
            self.links.to_metadata_ids(&result_ids).await
        }
    }

    fn degrade(&self, selected_ids: &[String], reason: FallbackReason) -> Recommendations {
        let movie_ids = self.fallback.select(selected_ids);

        tracing::warn!(
            reason = %reason,
            recommendations = movie_ids.len(),
            "Serving fallback recommendations"
        );

        Recommendations::fallback(movie_ids, reason)
    }
}

/// Extracts ids from an engine payload
///
/// Accepts a non-empty JSON array whose entries are strings, integers or
/// records carrying a `movieId`. Anything else is malformed.
fn parse_engine_payload(payload: &Value) -> Option<Vec<String>> {
    let entries = payload.as_array().filter(|entries| !entries.is_empty())?;
    entries.iter().map(payload_entry_id).collect()
}

fn payload_entry_id(entry: &Value) -> Option<String> {
    match entry {
        Value::String(id) => Some(id.clone()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        Value::Object(record) => record.get("movieId").and_then(|id| match id {
            Value::Object(_) => None,
            other => payload_entry_id(other),
        }),
        _ => None,
    }
}

/// All ids are non-empty runs of ASCII digits
fn looks_like_metadata_ids(ids: &[String]) -> bool {
    ids.iter()
        .all(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}
