//! Integration tests for popcorn
//!
//! These drive the search controller, the session, and the watch list through
//! the public API with a scripted provider.

use popcorn::providers::mock::make_movies;
use popcorn::providers::{MockProvider, ProviderError};
use popcorn::search::{NOT_FOUND_MESSAGE, REQUEST_FAILED_MESSAGE};
use popcorn::watchlist::{FileStorage, MemoryStorage};
use popcorn::{MovieDetails, SearchController, Session, WatchList, WatchedMovie};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn controller(provider: &Arc<MockProvider>) -> SearchController {
    SearchController::new(Arc::clone(provider) as Arc<dyn popcorn::MovieProvider>)
}

/// Give spawned tasks a chance to run
async fn let_tasks_run() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test]
async fn test_short_query_never_reaches_provider() {
    let provider = Arc::new(MockProvider::new());
    let mut search = controller(&provider);

    search.set_query("ab");
    let state = search.settled().await;

    assert_eq!(state.query, "ab");
    assert!(state.results.is_empty());
    assert!(!state.is_loading);
    assert_eq!(state.error, None);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_search_returns_results_in_provider_order() {
    let provider = Arc::new(MockProvider::new());
    provider.set_results("batman", make_movies("Batman", 5));
    let mut search = controller(&provider);

    search.set_query("batman");
    assert!(search.state().is_loading);

    let state = search.settled().await;
    assert_eq!(state.len(), 5);
    assert_eq!(state.results[0].title, "Batman 1");
    assert_eq!(state.results[4].title, "Batman 5");
    assert_eq!(state.error, None);
    assert!(!state.is_loading);
    assert_eq!(provider.calls(), vec!["batman"]);
}

#[tokio::test]
async fn test_short_query_supersedes_outstanding_search() {
    let provider = Arc::new(MockProvider::new());
    provider.set_results("batman", make_movies("Batman", 5));
    let gate = provider.hold("batman");
    let mut search = controller(&provider);

    search.set_query("batman");
    let_tasks_run().await;
    search.set_query("x");

    gate.release();
    let_tasks_run().await;

    let state = search.state();
    assert_eq!(state.query, "x");
    assert!(state.results.is_empty());
    assert!(!state.is_loading);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_earlier_request_settling_late_is_discarded() {
    let provider = Arc::new(MockProvider::new());
    provider.set_results("batman", make_movies("Batman", 5));
    provider.set_results("batmobile", make_movies("Batmobile", 2));
    let gate = provider.hold("batman");
    let mut search = controller(&provider);

    search.set_query("batman");
    let_tasks_run().await;
    search.set_query("batmobile");

    let state = search.settled().await;
    assert_eq!(state.query, "batmobile");
    assert_eq!(state.len(), 2);

    gate.release();
    let_tasks_run().await;

    let state = search.state();
    assert_eq!(state.query, "batmobile");
    assert_eq!(state.len(), 2);
    assert_eq!(state.results[0].title, "Batmobile 1");
    assert_eq!(provider.calls(), vec!["batman", "batmobile"]);
}

#[tokio::test]
async fn test_no_match_sets_not_found_message() {
    let provider = Arc::new(MockProvider::new());
    let mut search = controller(&provider);

    search.set_query("qwertyuiop");
    let state = search.settled().await;

    assert!(state.results.is_empty());
    assert_eq!(state.error.as_deref(), Some(NOT_FOUND_MESSAGE));
}

#[tokio::test]
async fn test_transport_failure_sets_generic_message() {
    let provider = Arc::new(MockProvider::new());
    provider.set_error(
        "batman",
        ProviderError::Network("connection refused".to_string()),
    );
    let mut search = controller(&provider);

    search.set_query("batman");
    let state = search.settled().await;

    assert!(state.results.is_empty());
    assert_eq!(state.error.as_deref(), Some(REQUEST_FAILED_MESSAGE));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_new_query_clears_previous_error_and_results() {
    let provider = Arc::new(MockProvider::new());
    provider.set_results("alien", make_movies("Alien", 3));
    let mut search = controller(&provider);

    search.set_query("zzzzzz");
    assert!(search.settled().await.error.is_some());

    search.set_query("alien");
    let loading = search.state();
    assert!(loading.is_loading);
    assert!(loading.results.is_empty());
    assert_eq!(loading.error, None);

    assert_eq!(search.settled().await.len(), 3);
}

#[tokio::test]
async fn test_query_change_callback_sees_every_change() {
    let provider = Arc::new(MockProvider::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut search = controller(&provider).on_query_change({
        let seen = Arc::clone(&seen);
        move |q| seen.lock().unwrap().push(q.to_string())
    });

    for query in ["m", "ma", "mat", "ma", ""] {
        search.set_query(query);
    }

    assert_eq!(*seen.lock().unwrap(), vec!["m", "ma", "mat", "ma", ""]);
}

#[tokio::test]
async fn test_subscriber_observes_loading_then_results() {
    let provider = Arc::new(MockProvider::new());
    provider.set_results("heat", make_movies("Heat", 1));
    let gate = provider.hold("heat");
    let mut search = controller(&provider);
    let mut rx = search.subscribe();

    search.set_query("heat");
    assert!(rx.borrow_and_update().is_loading);

    gate.release();
    let state = rx.wait_for(|s| !s.is_loading).await.unwrap().clone();
    assert_eq!(state.len(), 1);
}

#[tokio::test]
async fn test_dropping_controller_cancels_search() {
    let provider = Arc::new(MockProvider::new());
    provider.set_results("heat", make_movies("Heat", 1));
    let gate = provider.hold("heat");
    let mut search = controller(&provider);
    let rx = search.subscribe();

    search.set_query("heat");
    drop(search);
    gate.release();
    let_tasks_run().await;

    assert!(rx.borrow().results.is_empty());
}

fn heat() -> MovieDetails {
    MovieDetails {
        imdb_id: "tt0113277".to_string(),
        title: "Heat".to_string(),
        year: "1995".to_string(),
        runtime: "170 min".to_string(),
        imdb_rating: "8.3".to_string(),
        director: "Michael Mann".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_session_search_rate_and_add() {
    let provider = Arc::new(MockProvider::new());
    provider.set_results("heat", vec![popcorn::MovieSummary::new("tt0113277", "Heat", "1995")]);
    provider.set_details(heat());

    let dir = tempfile::tempdir().unwrap();
    let watchlist = WatchList::open_dir(dir.path()).unwrap();
    let mut session = Session::new(provider, watchlist);

    session.set_query("heat");
    let state = session.settled().await;
    let id = state.results[0].imdb_id.clone();

    assert!(session.select(&id));
    session.load_details().await.unwrap();
    session.rate(8).unwrap();
    let watched = session.add_selected().await.unwrap();

    assert_eq!(watched.title, "Heat");
    assert_eq!(watched.imdb_rating, 8.3);
    assert_eq!(watched.runtime, 170);
    assert_eq!(watched.user_rating, 8);

    // A fresh list over the same directory sees the entry
    let reopened = WatchList::open_dir(dir.path()).unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.user_rating("tt0113277"), Some(8));
}

fn watched(id: &str, imdb: f64, user: u8, runtime: u32) -> WatchedMovie {
    WatchedMovie {
        imdb_id: id.to_string(),
        title: format!("Movie {}", id),
        year: "2000".to_string(),
        poster: "N/A".to_string(),
        imdb_rating: imdb,
        runtime,
        user_rating: user,
        rating_decisions: 1,
    }
}

#[test]
fn test_watchlist_add_remove_round_trip() {
    let storage = MemoryStorage::new();
    let mut list = WatchList::open(storage.clone()).unwrap();

    list.add(watched("tt1", 8.0, 9, 120)).unwrap();
    list.add(watched("tt2", 6.0, 5, 90)).unwrap();
    assert_eq!(list.len(), 2);

    assert!(list.remove("tt1").unwrap());
    assert_eq!(list.len(), 1);
    assert!(!list.contains("tt1"));

    let reopened = WatchList::open(storage).unwrap();
    assert_eq!(reopened.entries(), list.entries());
}

#[test]
fn test_watchlist_file_uses_stored_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut list = WatchList::open(FileStorage::new(dir.path())).unwrap();
    list.add(watched("tt1", 7.5, 8, 101)).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("watched.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value[0];
    assert_eq!(entry["imdbID"], "tt1");
    assert_eq!(entry["imdbRating"], 7.5);
    assert_eq!(entry["userRating"], 8);
    assert_eq!(entry["runtime"], 101);
}
