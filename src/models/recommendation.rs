use serde::{Deserialize, Serialize};

/// Recommended TMDB ids plus where they came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub movie_ids: Vec<String>,
    pub source: RecommendationSource,
}

impl Recommendations {
    pub fn personalized(movie_ids: Vec<String>) -> Self {
        Self {
            movie_ids,
            source: RecommendationSource::Personalized,
        }
    }

    pub fn fallback(movie_ids: Vec<String>, reason: FallbackReason) -> Self {
        Self {
            movie_ids,
            source: RecommendationSource::Fallback(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, RecommendationSource::Fallback(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    /// Produced by the recommendation engine
    Personalized,
    /// Produced by the static fallback pool
    Fallback(FallbackReason),
}

impl Serialize for RecommendationSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecommendationSource::Personalized => serializer.serialize_str("personalized"),
            RecommendationSource::Fallback(_) => serializer.serialize_str("fallback"),
        }
    }
}

/// Why a pipeline pass ended on the fallback pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// None of the seed movies has a catalog id
    NoMappedSeeds,
    /// The engine call failed or returned a non-success status
    EngineUnavailable,
    /// The engine answered with something other than a non-empty id list
    MalformedPayload,
    /// Engine results could not be translated back to TMDB ids
    NoMappedResults,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            FallbackReason::NoMappedSeeds => "no_mapped_seeds",
            FallbackReason::EngineUnavailable => "engine_unavailable",
            FallbackReason::MalformedPayload => "malformed_payload",
            FallbackReason::NoMappedResults => "no_mapped_results",
        };
        write!(f, "{}", reason)
    }
}

/// Reachability of the recommendation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Online,
    Offline,
}

/// Id namespace the engine answers in
///
/// `Auto` keeps results that are all digit strings as TMDB ids and
/// translates anything else from catalog ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultNamespace {
    #[default]
    Auto,
    Catalog,
    Metadata,
}
