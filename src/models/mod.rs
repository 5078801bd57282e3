//! Core data models for movies, search state, and the watch list.

mod movie;
mod search;
mod watched;

pub use movie::{MovieDetails, MovieSummary};
pub use search::SearchState;
pub use watched::WatchedMovie;
