//! Movie data providers.
//!
//! This module defines the [`MovieProvider`] trait that the search controller
//! and the detail view talk to. [`OmdbProvider`] is the real implementation
//! backed by the OMDb HTTP API; [`MockProvider`] serves scripted responses and
//! is what the tests drive the controller with.
//!
//! # Implementing a New Provider
//!
//! 1. Create a struct that implements `MovieProvider`
//! 2. Implement `id`, `name`, `search` and, if the provider can look up a
//!    single title, `get_by_id`
//! 3. Report "no match" as [`ProviderError::NotFound`]; every other failure
//!    is shown to the user as a generic request failure

pub mod mock;
mod omdb;

pub use mock::MockProvider;
pub use omdb::OmdbProvider;

use crate::models::{MovieDetails, MovieSummary};
use async_trait::async_trait;

/// Interface to an external movie database
#[async_trait]
pub trait MovieProvider: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this provider (e.g. "omdb")
    fn id(&self) -> &str;

    /// Human-readable name of this provider
    fn name(&self) -> &str;

    /// Search for titles matching `term`, in provider order
    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>, ProviderError>;

    /// Get the full record of a single title
    async fn get_by_id(&self, id: &str) -> Result<MovieDetails, ProviderError>;
}

/// Errors that can occur when talking to a provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered but had nothing matching
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from the provider
    #[error("API error: {0}")]
    Api(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Whether the provider reported an empty match rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(format!("JSON: {}", err))
    }
}
