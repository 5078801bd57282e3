//! Application context tying search, the detail view, and the watch list
//! together.
//!
//! Changing the query closes any open detail view, the same way the search
//! box and the detail pane interact in the interactive front end.

use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::models::{MovieDetails, SearchState, WatchedMovie};
use crate::providers::{MovieProvider, OmdbProvider, ProviderError};
use crate::rating::{RatingDraft, RatingError};
use crate::search::SearchController;
use crate::watchlist::{WatchList, WatchListError};

/// Errors raised by session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    WatchList(#[from] WatchListError),

    #[error(transparent)]
    Rating(#[from] RatingError),

    /// No detail view is open
    #[error("no movie selected")]
    NothingSelected,
}

/// The open detail view
#[derive(Debug, Clone)]
struct Selection {
    imdb_id: String,
    details: Option<MovieDetails>,
    draft: RatingDraft,
}

impl Selection {
    fn new(imdb_id: String) -> Self {
        Self {
            imdb_id,
            details: None,
            draft: RatingDraft::new(),
        }
    }
}

/// Top-level application state
#[derive(Debug)]
pub struct Session {
    controller: SearchController,
    provider: Arc<dyn MovieProvider>,
    watchlist: WatchList,
    selection: Arc<Mutex<Option<Selection>>>,
}

impl Session {
    /// Build a session searching `provider` and recording into `watchlist`
    pub fn new(provider: Arc<dyn MovieProvider>, watchlist: WatchList) -> Self {
        Self::with_min_query_len(provider, watchlist, crate::search::MIN_QUERY_LEN)
    }

    /// Like [`Session::new`] with a custom search length gate
    pub fn with_min_query_len(
        provider: Arc<dyn MovieProvider>,
        watchlist: WatchList,
        min_query_len: usize,
    ) -> Self {
        let selection: Arc<Mutex<Option<Selection>>> = Arc::new(Mutex::new(None));

        let controller = SearchController::new(Arc::clone(&provider))
            .with_min_query_len(min_query_len)
            .on_query_change({
                let selection = Arc::clone(&selection);
                move |_| {
                    selection.lock().unwrap().take();
                }
            });

        Self {
            controller,
            provider,
            watchlist,
            selection,
        }
    }

    /// Build a session against OMDb with the configured watch-list directory
    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        let provider = OmdbProvider::from_config(&config.provider)?;
        let watchlist = WatchList::open_dir(config.storage.data_dir())?;
        Ok(Self::with_min_query_len(
            Arc::new(provider),
            watchlist,
            config.search.min_query_len,
        ))
    }

    // ========== SEARCH ==========

    /// Feed a new value of the search box
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.controller.set_query(query);
    }

    /// Re-issue the current query
    pub fn retry(&mut self) {
        self.controller.retry();
    }

    /// Current search state
    pub fn search_state(&self) -> SearchState {
        self.controller.state()
    }

    /// Wait for the outstanding search to settle
    pub async fn settled(&self) -> SearchState {
        self.controller.settled().await
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    // ========== DETAIL VIEW ==========

    /// Open the detail view for `imdb_id`; selecting the open movie closes it.
    ///
    /// Returns whether a detail view is open afterwards.
    pub fn select(&mut self, imdb_id: &str) -> bool {
        let mut selection = self.selection.lock().unwrap();
        if selection.as_ref().is_some_and(|s| s.imdb_id == imdb_id) {
            *selection = None;
            false
        } else {
            *selection = Some(Selection::new(imdb_id.to_string()));
            true
        }
    }

    /// Close the detail view
    pub fn close(&mut self) {
        self.selection.lock().unwrap().take();
    }

    /// Id of the movie in the open detail view
    pub fn selected_id(&self) -> Option<String> {
        self.selection
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.imdb_id.clone())
    }

    /// Fetch details for the open movie.
    ///
    /// If the selection changes while the request is outstanding the details
    /// are still returned but not attached to the new selection.
    pub async fn load_details(&self) -> Result<MovieDetails, SessionError> {
        let imdb_id = self.selected_id().ok_or(SessionError::NothingSelected)?;
        let details = self.provider.get_by_id(&imdb_id).await?;

        let mut selection = self.selection.lock().unwrap();
        if let Some(current) = selection.as_mut().filter(|s| s.imdb_id == imdb_id) {
            current.details = Some(details.clone());
        }
        Ok(details)
    }

    /// Rate the open movie
    pub fn rate(&mut self, rating: u8) -> Result<(), SessionError> {
        let mut selection = self.selection.lock().unwrap();
        let current = selection.as_mut().ok_or(SessionError::NothingSelected)?;
        if self.watchlist.contains(&current.imdb_id) {
            return Err(WatchListError::AlreadyWatched(current.imdb_id.clone()).into());
        }
        current.draft.rate(rating)?;
        Ok(())
    }

    /// Rating chosen in the open detail view
    pub fn draft_rating(&self) -> Option<u8> {
        self.selection
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|s| s.draft.rating())
    }

    /// Add the open, rated movie to the watch list and close the detail view
    pub async fn add_selected(&mut self) -> Result<WatchedMovie, SessionError> {
        let (imdb_id, details, draft) = {
            let selection = self.selection.lock().unwrap();
            let current = selection.as_ref().ok_or(SessionError::NothingSelected)?;
            (
                current.imdb_id.clone(),
                current.details.clone(),
                current.draft.clone(),
            )
        };
        if draft.rating().is_none() {
            return Err(RatingError::Unrated.into());
        }

        let details = match details {
            Some(details) => details,
            None => self.provider.get_by_id(&imdb_id).await?,
        };

        let mut watched = draft.to_watched(&details)?;
        watched.imdb_id = imdb_id;
        self.watchlist.add(watched.clone())?;
        tracing::info!(id = %watched.imdb_id, rating = watched.user_rating, "added to watch list");

        self.close();
        Ok(watched)
    }

    // ========== WATCH LIST ==========

    pub fn watchlist(&self) -> &WatchList {
        &self.watchlist
    }

    /// Remove a movie from the watch list
    pub fn remove_watched(&mut self, imdb_id: &str) -> Result<bool, SessionError> {
        Ok(self.watchlist.remove(imdb_id)?)
    }
}
