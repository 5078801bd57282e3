use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{MIN_QUERY_LEN, NOT_FOUND_MESSAGE, REQUEST_FAILED_MESSAGE};
use crate::models::{MovieSummary, SearchState};
use crate::providers::{MovieProvider, ProviderError};

type QueryChangeCallback = Box<dyn FnMut(&str) + Send>;

/// Owns the current query and the single outstanding search request.
///
/// Requests run as spawned tokio tasks, so the controller must be used from
/// inside a runtime. State is published through a `watch` channel; callers
/// either poll [`state`](Self::state) or [`subscribe`](Self::subscribe).
pub struct SearchController {
    provider: Arc<dyn MovieProvider>,
    state: Arc<watch::Sender<SearchState>>,
    in_flight: Option<InFlight>,
    min_query_len: usize,
    on_query_change: Option<QueryChangeCallback>,
}

struct InFlight {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SearchController {
    /// Create a controller searching `provider`
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            provider,
            state: Arc::new(state),
            in_flight: None,
            min_query_len: MIN_QUERY_LEN,
            on_query_change: None,
        }
    }

    /// Override the minimum query length
    pub fn with_min_query_len(mut self, min_query_len: usize) -> Self {
        self.min_query_len = min_query_len;
        self
    }

    /// Register a callback run once per query change, before the new request
    /// is issued
    pub fn on_query_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_query_change = Some(Box::new(callback));
        self
    }

    /// Provider this controller searches
    pub fn provider(&self) -> &Arc<dyn MovieProvider> {
        &self.provider
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Current query
    pub fn query(&self) -> String {
        self.state.borrow().query.clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Whether a request is outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|f| !f.handle.is_finished())
    }

    /// Feed a new value of the search box.
    ///
    /// A value equal to the current query is not a change and is ignored.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if self.state.borrow().query == query {
            return;
        }
        self.issue(query);
    }

    /// Re-issue the current query as if it had just been typed
    pub fn retry(&mut self) {
        let query = self.query();
        self.issue(query);
    }

    /// Cancel the outstanding request, if any, and clear the loading flag.
    ///
    /// Results and error of the last settled request are kept.
    pub fn cancel(&mut self) {
        if self.abort_in_flight() {
            self.state.send_modify(|s| {
                s.epoch += 1;
                s.is_loading = false;
            });
        }
    }

    /// Wait until no request is outstanding and return the state
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.state.subscribe();
        let state = match rx.wait_for(SearchState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    fn issue(&mut self, query: String) {
        self.abort_in_flight();

        if let Some(callback) = self.on_query_change.as_mut() {
            callback(&query);
        }

        let gated = query.chars().count() < self.min_query_len;
        let mut epoch = 0;
        self.state.send_modify(|s| {
            s.epoch += 1;
            epoch = s.epoch;
            s.query = query.clone();
            s.results.clear();
            s.error = None;
            s.is_loading = !gated;
        });

        if gated {
            tracing::trace!(query = %query, "query below minimum length, skipping search");
            return;
        }

        tracing::debug!(query = %query, epoch, "issuing search");
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_search(
            Arc::clone(&self.provider),
            Arc::clone(&self.state),
            query,
            epoch,
            cancel.clone(),
        ));
        self.in_flight = Some(InFlight { cancel, handle });
    }

    /// Cancel the outstanding request; true if there was one
    fn abort_in_flight(&mut self) -> bool {
        match self.in_flight.take() {
            Some(in_flight) => {
                in_flight.cancel.cancel();
                !in_flight.handle.is_finished()
            }
            None => false,
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            in_flight.handle.abort();
        }
    }
}

impl fmt::Debug for SearchController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchController")
            .field("provider", &self.provider.id())
            .field("state", &*self.state.borrow())
            .field("in_flight", &self.is_in_flight())
            .field("min_query_len", &self.min_query_len)
            .finish()
    }
}

async fn run_search(
    provider: Arc<dyn MovieProvider>,
    state: Arc<watch::Sender<SearchState>>,
    query: String,
    epoch: u64,
    cancel: CancellationToken,
) {
    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::trace!(query = %query, epoch, "search cancelled");
            return;
        }
        result = provider.search(&query) => result,
    };

    if cancel.is_cancelled() {
        return;
    }

    match &outcome {
        Ok(results) => tracing::debug!(query = %query, count = results.len(), "search settled"),
        Err(e) if e.is_not_found() => tracing::debug!(query = %query, "no match"),
        Err(e) => tracing::warn!(query = %query, error = %e, "search failed"),
    }

    if !commit(&state, epoch, outcome) {
        tracing::debug!(query = %query, epoch, "discarding stale search result");
    }
}

/// Write a settled request into the state if `epoch` is still current.
///
/// The check and the write happen under the channel lock, so a query change
/// can never slip in between them.
fn commit(
    state: &watch::Sender<SearchState>,
    epoch: u64,
    outcome: Result<Vec<MovieSummary>, ProviderError>,
) -> bool {
    state.send_if_modified(|s| {
        if s.epoch != epoch {
            return false;
        }

        s.is_loading = false;
        match outcome {
            Ok(results) => {
                s.results = results;
                s.error = None;
            }
            Err(e) => {
                s.results.clear();
                s.error = Some(if e.is_not_found() {
                    NOT_FOUND_MESSAGE.to_string()
                } else {
                    REQUEST_FAILED_MESSAGE.to_string()
                });
            }
        }
        true
    })
}
