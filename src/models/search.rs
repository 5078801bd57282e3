//! Search state published by the search controller.

use serde::Serialize;

use super::MovieSummary;

/// Snapshot of the search box and what the last committed request said
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    /// Query the state belongs to
    pub query: String,

    /// Results of the most recent settled request, in provider order
    pub results: Vec<MovieSummary>,

    /// Whether a request for `query` is outstanding
    pub is_loading: bool,

    /// User-facing error message of the most recent settled request
    pub error: Option<String>,

    /// Bumped on every query change; a request may only commit while its
    /// epoch is still the current one.
    #[serde(skip)]
    pub(crate) epoch: u64,
}

impl SearchState {
    /// Request generation this state belongs to
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True when no request is outstanding
    pub fn is_settled(&self) -> bool {
        !self.is_loading
    }

    /// Number of results currently held
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when there are no results
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
