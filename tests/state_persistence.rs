//! State survives restarts, and a damaged state file never stops the monitor.

mod helpers;

use httptest::{matchers::*, responders::*, Expectation, Server};
use tempfile::TempDir;

use helpers::{config_with, text_tracker};
use tracker_watch::state::{PersistedState, StateStore};
use tracker_watch::Monitor;

#[tokio::test]
async fn test_restart_does_not_renotify_open_tracker() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/alpha"))
            .times(2)
            .respond_with(status_code(200).body("Signups are open")),
    );
    server.expect(
        Expectation::matching(request::method_path("POST", "/hook"))
            .times(1)
            .respond_with(status_code(200)),
    );

    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");
    let config = config_with(
        &server,
        &state_path,
        &[text_tracker(&server, "AlphaTracker", "/alpha")],
        "",
    );

    let mut first_run = Monitor::from_config(&config).await.unwrap();
    assert_eq!(first_run.run_once().await.unwrap().opened, 1);
    drop(first_run);

    let saved = StateStore::new(&state_path).try_load().await.unwrap().unwrap();
    assert!(saved.trackers["AlphaTracker"].is_open);

    let mut second_run = Monitor::from_config(&config).await.unwrap();
    assert_eq!(second_run.state(), &saved);
    assert_eq!(second_run.run_once().await.unwrap().opened, 0);
}

#[tokio::test]
async fn test_corrupt_state_file_starts_fresh_and_is_rewritten() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/alpha"))
            .respond_with(status_code(200).body("Registration closed")),
    );

    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");
    tokio::fs::write(&state_path, "{\"trackers\": [truncated")
        .await
        .unwrap();
    let config = config_with(
        &server,
        &state_path,
        &[text_tracker(&server, "AlphaTracker", "/alpha")],
        "",
    );

    let mut monitor = Monitor::from_config(&config).await.unwrap();
    assert_eq!(monitor.state(), &PersistedState::default());
    monitor.run_once().await.unwrap();

    let saved = StateStore::new(&state_path).try_load().await.unwrap().unwrap();
    let record = &saved.trackers["AlphaTracker"];
    assert!(!record.is_open);
    assert!(record.last_status_change.is_none());
}

#[tokio::test]
async fn test_unwritable_state_keeps_running_in_memory() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/alpha"))
            .respond_with(status_code(200).body("Signups are open")),
    );
    server.expect(
        Expectation::matching(request::method_path("POST", "/hook"))
            .respond_with(status_code(200)),
    );

    let dir = TempDir::new().unwrap();
    // A regular file where the state directory should be
    let blocker = dir.path().join("not_a_dir");
    tokio::fs::write(&blocker, "x").await.unwrap();
    let config = config_with(
        &server,
        &blocker.join("state.json"),
        &[text_tracker(&server, "AlphaTracker", "/alpha")],
        "",
    );

    let mut monitor = Monitor::from_config(&config).await.unwrap();
    let report = monitor.run_once().await.unwrap();
    assert_eq!(report.opened, 1);
    assert!(monitor.state().trackers["AlphaTracker"].is_open);
}
