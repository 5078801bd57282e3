//! Search-as-you-type request lifecycle.
//!
//! [`SearchController`] turns a stream of query edits into at most one
//! outstanding provider request. Every edit cancels the previous request, and
//! only the request for the latest query may write to the published
//! [`SearchState`](crate::models::SearchState).
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use popcorn::providers::MockProvider;
//! use popcorn::search::SearchController;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut controller = SearchController::new(Arc::new(MockProvider::new()));
//! controller.set_query("batman");
//! let state = controller.settled().await;
//! println!("{} results, error: {:?}", state.results.len(), state.error);
//! # }
//! ```

mod controller;

pub use controller::SearchController;

/// Shown when the provider answered but had no matching title
pub const NOT_FOUND_MESSAGE: &str = "Movie not found";

/// Shown for any other failed request
pub const REQUEST_FAILED_MESSAGE: &str = "Something went wrong";

/// Queries shorter than this many characters never reach the provider
pub const MIN_QUERY_LEN: usize = 3;
