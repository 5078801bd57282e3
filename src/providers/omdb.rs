//! OMDb movie provider implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::models::{MovieDetails, MovieSummary};
use crate::providers::{MovieProvider, ProviderError};
use crate::utils::HttpClient;

/// OMDb provider
///
/// Uses the OMDb JSON API: `?s=` for search and `?i=` for a single title.
#[derive(Debug, Clone)]
pub struct OmdbProvider {
    client: Arc<HttpClient>,
    api_key: String,
    base_url: String,
}

impl OmdbProvider {
    /// Create a provider for the given key and API base URL
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let base_url: String = base_url.into();
        Ok(Self {
            client: Arc::new(HttpClient::with_timeout(timeout)?),
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider from the `[provider]` configuration section
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::new(&config.api_key, &config.base_url, config.timeout())
    }

    fn url(&self, param: &str, value: &str) -> String {
        format!(
            "{}/?apikey={}&{}={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            param,
            urlencoding::encode(value)
        )
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to reach OMDb: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "OMDb returned status: {}",
                response.status()
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl MovieProvider for OmdbProvider {
    fn id(&self) -> &str {
        "omdb"
    }

    fn name(&self) -> &str {
        "OMDb"
    }

    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>, ProviderError> {
        if term.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "search term is empty".to_string(),
            ));
        }

        tracing::debug!(term, "searching OMDb");
        let response = self.fetch(&self.url("s", term)).await?;

        let data: OmdbSearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse JSON: {}", e)))?;

        if !data.is_success() {
            return Err(ProviderError::NotFound(
                data.error.unwrap_or_else(|| "Movie not found!".to_string()),
            ));
        }

        tracing::debug!(
            term,
            count = data.search.len(),
            total = data.total_results.as_deref().unwrap_or("?"),
            "OMDb search finished"
        );
        Ok(data.search)
    }

    async fn get_by_id(&self, id: &str) -> Result<MovieDetails, ProviderError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ProviderError::InvalidRequest("movie id is empty".to_string()));
        }

        tracing::debug!(id, "fetching OMDb details");
        let response = self.fetch(&self.url("i", id)).await?;

        let data: OmdbDetailResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse JSON: {}", e)))?;

        if data.response != "True" {
            return Err(ProviderError::NotFound(
                data.error.unwrap_or_else(|| format!("No movie with id {}", id)),
            ));
        }

        let mut details = data.details;
        if details.imdb_id.is_empty() {
            details.imdb_id = id.to_string();
        }
        Ok(details)
    }
}

// ===== OMDb API Types =====

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<MovieSummary>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl OmdbSearchResponse {
    fn is_success(&self) -> bool {
        self.response == "True"
    }
}

#[derive(Debug, Deserialize)]
struct OmdbDetailResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(flatten)]
    details: MovieDetails,
}
