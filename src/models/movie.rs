//! Movie records as returned by the provider.
//!
//! Field names follow the provider's JSON so a response body deserializes
//! straight into these types. Nothing is normalized: a missing field becomes
//! an empty string and the poster stays whatever URL (or `"N/A"`) came back.

use serde::{Deserialize, Serialize};

/// A single entry in a search result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Provider identifier (e.g. `tt0372784`)
    #[serde(rename = "imdbID")]
    pub imdb_id: String,

    /// Movie title
    #[serde(rename = "Title", default)]
    pub title: String,

    /// Release year, or a range for series (`"2005"`, `"2008–2013"`)
    #[serde(rename = "Year", default)]
    pub year: String,

    /// Poster URL
    #[serde(rename = "Poster", default)]
    pub poster: String,

    /// Entry type (`movie`, `series`, `episode`)
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl MovieSummary {
    /// Create a summary with an empty poster and no type
    pub fn new(imdb_id: impl Into<String>, title: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            imdb_id: imdb_id.into(),
            title: title.into(),
            year: year.into(),
            poster: String::new(),
            kind: None,
        }
    }

    /// Set the poster URL
    pub fn poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = poster.into();
        self
    }
}

/// Full detail record for a single movie
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,

    #[serde(rename = "Title", default)]
    pub title: String,

    #[serde(rename = "Year", default)]
    pub year: String,

    #[serde(rename = "Poster", default)]
    pub poster: String,

    /// Runtime as the provider formats it (`"148 min"`)
    #[serde(rename = "Runtime", default)]
    pub runtime: String,

    /// Provider rating as text (`"8.8"`, or `"N/A"`)
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,

    #[serde(rename = "Plot", default)]
    pub plot: String,

    #[serde(rename = "Released", default)]
    pub released: String,

    #[serde(rename = "Actors", default)]
    pub actors: String,

    #[serde(rename = "Director", default)]
    pub director: String,

    #[serde(rename = "Genre", default)]
    pub genre: String,
}

impl MovieDetails {
    /// Runtime in minutes, taken from the leading number of the runtime text.
    ///
    /// Returns 0 when the provider has no runtime (`"N/A"`).
    pub fn runtime_minutes(&self) -> u32 {
        self.runtime
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }

    /// Provider rating as a number, 0.0 when unrated
    pub fn imdb_rating_value(&self) -> f64 {
        self.imdb_rating
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_deserializes_provider_fields() {
        let json = r#"{
            "Title": "Batman Begins",
            "Year": "2005",
            "imdbID": "tt0372784",
            "Type": "movie",
            "Poster": "https://example.com/batman.jpg"
        }"#;

        let movie: MovieSummary = serde_json::from_str(json).unwrap();
        assert_eq!(movie.imdb_id, "tt0372784");
        assert_eq!(movie.title, "Batman Begins");
        assert_eq!(movie.year, "2005");
        assert_eq!(movie.kind.as_deref(), Some("movie"));
    }

    #[test]
    fn test_details_missing_fields_default_to_empty() {
        let details: MovieDetails = serde_json::from_str(r#"{"Title": "Heat"}"#).unwrap();
        assert_eq!(details.title, "Heat");
        assert!(details.plot.is_empty());
        assert_eq!(details.runtime_minutes(), 0);
    }

    #[test]
    fn test_runtime_minutes() {
        let details = MovieDetails {
            runtime: "148 min".to_string(),
            ..Default::default()
        };
        assert_eq!(details.runtime_minutes(), 148);

        let unknown = MovieDetails {
            runtime: "N/A".to_string(),
            ..Default::default()
        };
        assert_eq!(unknown.runtime_minutes(), 0);
    }

    #[test]
    fn test_imdb_rating_value() {
        let details = MovieDetails {
            imdb_rating: "8.8".to_string(),
            ..Default::default()
        };
        assert_eq!(details.imdb_rating_value(), 8.8);

        let unrated = MovieDetails {
            imdb_rating: "N/A".to_string(),
            ..Default::default()
        };
        assert_eq!(unrated.imdb_rating_value(), 0.0);
    }
}
