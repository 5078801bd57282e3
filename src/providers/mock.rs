//! Mock provider for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::models::{MovieDetails, MovieSummary};
use crate::providers::{MovieProvider, ProviderError};

/// A mock provider that returns predefined responses.
///
/// Searches for a term with no scripted response fail with
/// [`ProviderError::NotFound`], the same way the real API answers an unknown
/// title. A term can be held with [`MockProvider::hold`] so its next search
/// blocks until the returned gate is released; tests use this to settle
/// requests in any order they like.
#[derive(Debug, Default)]
pub struct MockProvider {
    searches: Mutex<HashMap<String, Result<Vec<MovieSummary>, ProviderError>>>,
    details: Mutex<HashMap<String, MovieDetails>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

/// Handle that unblocks a held search
#[derive(Debug, Clone)]
pub struct MockGate {
    notify: Arc<Notify>,
}

impl MockGate {
    /// Let the held search finish
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the results returned for `term`.
    pub fn set_results(&self, term: &str, results: Vec<MovieSummary>) {
        let mut guard = self.searches.lock().unwrap();
        guard.insert(term.to_string(), Ok(results));
    }

    /// Script a failure for `term`.
    pub fn set_error(&self, term: &str, error: ProviderError) {
        let mut guard = self.searches.lock().unwrap();
        guard.insert(term.to_string(), Err(error));
    }

    /// Script the detail record returned for its id.
    pub fn set_details(&self, details: MovieDetails) {
        let mut guard = self.details.lock().unwrap();
        guard.insert(details.imdb_id.clone(), details);
    }

    /// Block the next search for `term` until the gate is released.
    pub fn hold(&self, term: &str) -> MockGate {
        let notify = Arc::new(Notify::new());
        let mut guard = self.gates.lock().unwrap();
        guard.insert(term.to_string(), Arc::clone(&notify));
        MockGate { notify }
    }

    /// Terms searched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of searches issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MovieProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Provider"
    }

    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>, ProviderError> {
        self.calls.lock().unwrap().push(term.to_string());

        let gate = self.gates.lock().unwrap().remove(term);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let guard = self.searches.lock().unwrap();
        match guard.get(term) {
            Some(response) => response.clone(),
            None => Err(ProviderError::NotFound("Movie not found!".to_string())),
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<MovieDetails, ProviderError> {
        let guard = self.details.lock().unwrap();
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("Incorrect IMDb ID: {}", id)))
    }
}

/// Helper function to create a list of numbered movies for testing.
pub fn make_movies(prefix: &str, count: usize) -> Vec<MovieSummary> {
    (1..=count)
        .map(|i| {
            MovieSummary::new(
                format!("tt{:07}", i),
                format!("{} {}", prefix, i),
                format!("{}", 1990 + i),
            )
        })
        .collect()
}
