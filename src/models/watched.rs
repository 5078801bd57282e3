//! Watched-movie record kept in the watch list.

use serde::{Deserialize, Serialize};

/// A rated movie in the user's watch list.
///
/// Serialized with the same keys the list has always been stored under, so an
/// existing `watched.json` keeps loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedMovie {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub year: String,

    #[serde(default)]
    pub poster: String,

    /// Provider rating at the time the movie was added
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: f64,

    /// Runtime in minutes
    #[serde(default)]
    pub runtime: u32,

    /// The user's own rating, 1 to 10
    #[serde(rename = "userRating")]
    pub user_rating: u8,

    /// How many times the rating was changed before the movie was added
    #[serde(rename = "countRatingDecisions", default)]
    pub rating_decisions: u32,
}
