/// Catalog id ↔ TMDB id mapping backed by the remote links dataset
///
/// The dataset is a plain CSV with a header row naming at least `movieId`
/// and `tmdbId`. It is fetched lazily, parsed once, and held for the life
/// of the process. Failed or empty loads are never memoized, so the next
/// call fetches again.
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use tokio::sync::OnceCell;

use crate::{
    error::{AppError, AppResult},
    models::MovieLink,
};

const CATALOG_ID_COLUMN: &str = "movieId";
const METADATA_ID_COLUMN: &str = "tmdbId";

/// Errors raised while parsing the links CSV
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LinkParseError {
    #[error("links dataset is empty")]
    Empty,

    #[error("links header is missing the {0} column")]
    MissingColumn(&'static str),
}

/// Raw source of the links dataset
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LinkSource: Send + Sync {
    /// Fetch the dataset body
    async fn fetch(&self) -> AppResult<String>;
}

/// Fetches the dataset over HTTP
pub struct HttpLinkSource {
    http_client: HttpClient,
    url: String,
}

impl HttpLinkSource {
    pub fn new(url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http_client, url })
    }
}

#[async_trait::async_trait]
impl LinkSource for HttpLinkSource {
    async fn fetch(&self) -> AppResult<String> {
        let response = self.http_client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Links dataset returned status {}",
                status
            )));
        }

        Ok(response.text().await?)
    }
}

/// Source for services built from an in-memory mapping; never yields data
struct EmptyLinkSource;

#[async_trait::async_trait]
impl LinkSource for EmptyLinkSource {
    async fn fetch(&self) -> AppResult<String> {
        Err(AppError::NotFound("no links dataset configured".to_string()))
    }
}

/// Parses the links CSV into rows, keeping input order
///
/// Columns are located by header name. Blank lines and lines with too few
/// fields are skipped. Quoted fields are not supported.
pub fn parse_links(csv: &str) -> Result<Vec<MovieLink>, LinkParseError> {
    let mut lines = csv.lines();
    let header = lines.next().ok_or(LinkParseError::Empty)?;
    let columns: Vec<&str> = header.trim().split(',').map(str::trim).collect();

    let catalog_idx = columns
        .iter()
        .position(|c| *c == CATALOG_ID_COLUMN)
        .ok_or(LinkParseError::MissingColumn(CATALOG_ID_COLUMN))?;
    let metadata_idx = columns
        .iter()
        .position(|c| *c == METADATA_ID_COLUMN)
        .ok_or(LinkParseError::MissingColumn(METADATA_ID_COLUMN))?;
    let min_fields = catalog_idx.max(metadata_idx) + 1;

    let links = lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let values: Vec<&str> = line.split(',').collect();
            if values.len() < min_fields {
                return None;
            }
            Some(MovieLink::new(
                values[catalog_idx].trim(),
                values[metadata_idx].trim(),
            ))
        })
        .collect();

    Ok(links)
}

/// Process-wide mapping between catalog ids and TMDB ids
pub struct MovieLinkService {
    source: Arc<dyn LinkSource>,
    links: OnceCell<Arc<Vec<MovieLink>>>,
}

impl MovieLinkService {
    pub fn new(source: Arc<dyn LinkSource>) -> Self {
        Self {
            source,
            links: OnceCell::new(),
        }
    }

    /// Builds a service around an already known mapping
    pub fn with_links(links: Vec<MovieLink>) -> Self {
        let cached = (!links.is_empty()).then(|| Arc::new(links));
        Self {
            source: Arc::new(EmptyLinkSource),
            links: OnceCell::new_with(cached),
        }
    }

    /// Returns the mapping, fetching it on first use
    ///
    /// Never fails: fetch or parse errors produce an empty mapping and leave
    /// the cache unset.
    ///
    /// Concurrent first callers fetch independently and the first successful
    /// result is kept. No caller waits on another caller's fetch.
    pub async fn load(&self) -> Arc<Vec<MovieLink>> {
        if let Some(links) = self.links.get() {
            return links.clone();
        }

        match self.fetch_links().await {
            Ok(links) => {
                // Losing the race is harmless: both mappings hold the same rows
                let _ = self.links.set(links.clone());
                links
            }
            Err(e) => {
                tracing::warn!(error = %e, "Movie links unavailable");
                Arc::default()
            }
        }
    }

    async fn fetch_links(&self) -> AppResult<Arc<Vec<MovieLink>>> {
        let body = self.source.fetch().await?;
        let links = parse_links(&body).map_err(|e| AppError::ExternalApi(e.to_string()))?;

        if links.is_empty() {
            return Err(AppError::ExternalApi(
                "links dataset contained no rows".to_string(),
            ));
        }

        tracing::info!(links = links.len(), "Loaded movie links dataset");

        Ok(Arc::new(links))
    }

    /// Translates TMDB ids to catalog ids, dropping unknown ids
    pub async fn to_catalog_ids(&self, metadata_ids: &[String]) -> Vec<String> {
        let links = self.load().await;
        metadata_ids
            .iter()
            .filter_map(|id| {
                links
                    .iter()
                    .find(|link| &link.metadata_id == id)
                    .map(|link| link.catalog_id.clone())
            })
            .collect()
    }

    /// Translates catalog ids to TMDB ids, dropping unknown ids
    pub async fn to_metadata_ids(&self, catalog_ids: &[String]) -> Vec<String> {
        let links = self.load().await;
        catalog_ids
            .iter()
            .filter_map(|id| {
                links
                    .iter()
                    .find(|link| &link.catalog_id == id)
                    .map(|link| link.metadata_id.clone())
            })
            .collect()
    }
}
