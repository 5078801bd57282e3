//! The user's watch list.
//!
//! The list is read once when opened and rewritten wholesale after every
//! mutation, as a JSON array under the [`WATCHED_KEY`] slot of a
//! [`Storage`] backend.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.local/share/popcorn/
//!   watched.json
//! ```

mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage};

use serde::Serialize;
use std::path::PathBuf;

use crate::models::WatchedMovie;

/// Slot the watch list is stored under
pub const WATCHED_KEY: &str = "watched";

/// Errors raised by the watch list
#[derive(Debug, thiserror::Error)]
pub enum WatchListError {
    /// The movie is already on the list
    #[error("{0} is already in your watch list")]
    AlreadyWatched(String),

    /// Reading or writing the storage slot failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The stored list could not be encoded or decoded
    #[error("Invalid watch list data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ordered list of rated movies mirrored to storage
#[derive(Debug)]
pub struct WatchList {
    storage: Box<dyn Storage>,
    movies: Vec<WatchedMovie>,
}

impl WatchList {
    /// Open the list kept in `storage`; an unwritten slot is an empty list
    pub fn open(storage: impl Storage + 'static) -> Result<Self, WatchListError> {
        let movies = match storage.load(WATCHED_KEY)? {
            Some(content) if !content.trim().is_empty() => serde_json::from_str(&content)?,
            _ => Vec::new(),
        };
        tracing::debug!(count = movies.len(), "watch list loaded");

        Ok(Self {
            storage: Box::new(storage),
            movies,
        })
    }

    /// Open the list kept as `watched.json` in `dir`
    pub fn open_dir(dir: impl Into<PathBuf>) -> Result<Self, WatchListError> {
        Self::open(FileStorage::new(dir))
    }

    /// Movies in the order they were added
    pub fn entries(&self) -> &[WatchedMovie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Whether the movie is on the list
    pub fn contains(&self, imdb_id: &str) -> bool {
        self.get(imdb_id).is_some()
    }

    /// Entry for a movie
    pub fn get(&self, imdb_id: &str) -> Option<&WatchedMovie> {
        self.movies.iter().find(|m| m.imdb_id == imdb_id)
    }

    /// The rating the user gave a watched movie
    pub fn user_rating(&self, imdb_id: &str) -> Option<u8> {
        self.get(imdb_id).map(|m| m.user_rating)
    }

    /// Append a movie and rewrite the stored list
    pub fn add(&mut self, movie: WatchedMovie) -> Result<(), WatchListError> {
        if self.contains(&movie.imdb_id) {
            return Err(WatchListError::AlreadyWatched(movie.imdb_id));
        }

        self.movies.push(movie);
        if let Err(e) = self.persist() {
            self.movies.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Remove a movie and rewrite the stored list; false if it was not listed
    pub fn remove(&mut self, imdb_id: &str) -> Result<bool, WatchListError> {
        let Some(index) = self.movies.iter().position(|m| m.imdb_id == imdb_id) else {
            return Ok(false);
        };

        let removed = self.movies.remove(index);
        if let Err(e) = self.persist() {
            self.movies.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }

    /// Aggregate numbers for the whole list
    pub fn summary(&self) -> WatchSummary {
        WatchSummary {
            count: self.movies.len(),
            avg_imdb_rating: average(self.movies.iter().map(|m| m.imdb_rating)),
            avg_user_rating: average(self.movies.iter().map(|m| f64::from(m.user_rating))),
            avg_runtime: average(self.movies.iter().map(|m| f64::from(m.runtime))),
        }
    }

    fn persist(&self) -> Result<(), WatchListError> {
        let json = serde_json::to_string(&self.movies)?;
        self.storage.save(WATCHED_KEY, &json)?;
        tracing::debug!(count = self.movies.len(), "watch list saved");
        Ok(())
    }
}

/// Totals shown above the watch list
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WatchSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    /// Minutes
    pub avg_runtime: f64,
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn watched(id: &str, imdb_rating: f64, user_rating: u8, runtime: u32) -> WatchedMovie {
        WatchedMovie {
            imdb_id: id.to_string(),
            title: format!("Movie {}", id),
            year: "2010".to_string(),
            poster: String::new(),
            imdb_rating,
            runtime,
            user_rating,
            rating_decisions: 1,
        }
    }

    #[test]
    fn test_add_then_remove_restores_list() {
        let storage = MemoryStorage::new();
        let mut list = WatchList::open(storage.clone()).unwrap();
        list.add(watched("tt1", 7.0, 8, 120)).unwrap();
        let before = list.entries().to_vec();
        let stored_before = storage.get(WATCHED_KEY);

        list.add(watched("tt2", 6.0, 5, 90)).unwrap();
        assert!(list.remove("tt2").unwrap());

        assert_eq!(list.entries(), before.as_slice());
        assert_eq!(storage.get(WATCHED_KEY), stored_before);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = MemoryStorage::new();
        let mut list = WatchList::open(storage.clone()).unwrap();

        list.add(watched("tt1", 7.0, 8, 120)).unwrap();
        let reopened = WatchList::open(storage.clone()).unwrap();
        assert_eq!(reopened.len(), 1);

        list.remove("tt1").unwrap();
        let reopened = WatchList::open(storage).unwrap();
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut list = WatchList::open(MemoryStorage::new()).unwrap();
        list.add(watched("tt1", 7.0, 8, 120)).unwrap();

        let err = list.add(watched("tt1", 7.0, 3, 120)).unwrap_err();
        assert!(matches!(err, WatchListError::AlreadyWatched(id) if id == "tt1"));
        assert_eq!(list.user_rating("tt1"), Some(8));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let storage = MemoryStorage::new();
        let mut list = WatchList::open(storage.clone()).unwrap();
        assert!(!list.remove("tt404").unwrap());
        assert_eq!(storage.get(WATCHED_KEY), None);
    }

    #[test]
    fn test_summary_averages() {
        let mut list = WatchList::open(MemoryStorage::new()).unwrap();
        assert_eq!(list.summary(), WatchSummary::default());

        list.add(watched("tt1", 8.0, 10, 100)).unwrap();
        list.add(watched("tt2", 6.0, 7, 150)).unwrap();

        let summary = list.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.avg_imdb_rating, 7.0);
        assert_eq!(summary.avg_user_rating, 8.5);
        assert_eq!(summary.avg_runtime, 125.0);
    }

    #[test]
    fn test_file_backed_list_keeps_order() {
        let dir = tempdir().unwrap();
        {
            let mut list = WatchList::open_dir(dir.path()).unwrap();
            list.add(watched("tt3", 5.0, 4, 80)).unwrap();
            list.add(watched("tt1", 9.0, 9, 130)).unwrap();
        }

        let list = WatchList::open_dir(dir.path()).unwrap();
        let ids: Vec<_> = list.entries().iter().map(|m| m.imdb_id.as_str()).collect();
        assert_eq!(ids, vec!["tt3", "tt1"]);
    }

    #[test]
    fn test_corrupt_slot_is_an_error() {
        let storage = MemoryStorage::new();
        storage.save(WATCHED_KEY, "{not json").unwrap();
        assert!(matches!(
            WatchList::open(storage),
            Err(WatchListError::Serialize(_))
        ));
    }
}
