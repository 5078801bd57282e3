//! # popcorn
//!
//! Search movies from a movie database as you type, open their details,
//! rate them, and keep the ratings in a local watch list.
//!
//! ## Architecture
//!
//! - [`search`]: the search-as-you-type request lifecycle ([`SearchController`])
//! - [`providers`]: movie database clients behind the [`MovieProvider`] trait
//! - [`watchlist`]: the persisted list of rated movies
//! - [`rating`]: rating a movie from its detail view
//! - [`session`]: application context wiring the pieces together
//! - [`models`]: movie records and search state
//! - [`config`]: configuration management
//! - [`ui`], [`utils`]: terminal output and HTTP helpers

pub mod config;
pub mod models;
pub mod providers;
pub mod rating;
pub mod search;
pub mod session;
pub mod ui;
pub mod utils;
pub mod watchlist;

// Re-export commonly used types
pub use models::{MovieDetails, MovieSummary, SearchState, WatchedMovie};
pub use providers::{MovieProvider, ProviderError};
pub use search::SearchController;
pub use session::Session;
pub use watchlist::WatchList;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
