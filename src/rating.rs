//! Rating a movie from its detail view.

use crate::models::{MovieDetails, WatchedMovie};

/// Highest rating a user can give
pub const MAX_RATING: u8 = 10;

/// Errors raised while rating
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("rating must be between 1 and 10, got {0}")]
    OutOfRange(u8),

    #[error("rate the movie before adding it to your list")]
    Unrated,
}

/// Rating chosen in an open detail view.
///
/// Counts how many times the user changed their mind before adding the movie;
/// picking the rating that is already selected does not count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingDraft {
    rating: Option<u8>,
    revisions: u32,
}

impl RatingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a rating from 1 to [`MAX_RATING`]
    pub fn rate(&mut self, rating: u8) -> Result<(), RatingError> {
        if rating == 0 || rating > MAX_RATING {
            return Err(RatingError::OutOfRange(rating));
        }
        if self.rating != Some(rating) {
            self.rating = Some(rating);
            self.revisions += 1;
        }
        Ok(())
    }

    /// Currently selected rating
    pub fn rating(&self) -> Option<u8> {
        self.rating
    }

    /// Number of times the rating was changed
    pub fn revisions(&self) -> u32 {
        self.revisions
    }

    /// Build the watch-list record for `details` with this rating
    pub fn to_watched(&self, details: &MovieDetails) -> Result<WatchedMovie, RatingError> {
        let user_rating = self.rating.ok_or(RatingError::Unrated)?;

        Ok(WatchedMovie {
            imdb_id: details.imdb_id.clone(),
            title: details.title.clone(),
            year: details.year.clone(),
            poster: details.poster.clone(),
            imdb_rating: details.imdb_rating_value(),
            runtime: details.runtime_minutes(),
            user_rating,
            rating_decisions: self.revisions,
        })
    }
}
