//! Tests for StateManager

use super::*;
use serde_json::{json, Value};
use tempfile::tempdir;

async fn mark(manager: &StateManager, stream: &str) -> Option<Value> {
    manager
        .stream_state(stream)
        .await
        .and_then(|s| s.replication_key_value)
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_new() {
    let manager = StateManager::new("/tmp/tap-state.json");
    assert!(!manager.is_in_memory());
    assert_eq!(manager.path().to_str().unwrap(), "/tmp/tap-state.json");
}

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[tokio::test]
async fn test_from_json() {
    let manager = StateManager::from_json(
        r#"{"twitter_metrics": {"replication_key_value": "2024-01-09T00:00:00"}}"#,
    )
    .unwrap();
    assert!(manager.is_in_memory());
    assert_eq!(
        mark(&manager, "twitter_metrics").await,
        Some(json!("2024-01-09T00:00:00"))
    );
    assert!(mark(&manager, "pinterest_account_stats").await.is_none());
}

#[tokio::test]
async fn test_from_empty_json() {
    let manager = StateManager::from_json("  ").unwrap();
    assert!(manager.state().await.streams.is_empty());
}

#[test]
fn test_from_invalid_json() {
    let err = StateManager::from_json("{not json").unwrap_err();
    assert!(matches!(err, crate::Error::State { .. }));
}

// ============================================================================
// Commit Tests
// ============================================================================

#[tokio::test]
async fn test_commit_never_lowers_mark() {
    let manager = StateManager::in_memory();

    manager
        .commit_stream(
            "facebook_page_metrics",
            StreamState::with_replication_value(json!("2024-01-10")),
        )
        .await;
    manager
        .commit_stream(
            "facebook_page_metrics",
            StreamState::with_replication_value(json!("2024-01-02")),
        )
        .await;

    assert_eq!(
        mark(&manager, "facebook_page_metrics").await,
        Some(json!("2024-01-10"))
    );
}

#[tokio::test]
async fn test_commit_replaces_bookmark() {
    let manager = StateManager::in_memory();
    let with_bookmark = StreamState {
        replication_key_value: None,
        bookmark: Some(crate::pagination::PageToken::Offset("50".to_string())),
    };
    manager.commit_stream("instagram_relationships", with_bookmark).await;
    assert!(manager
        .stream_state("instagram_relationships")
        .await
        .unwrap()
        .bookmark
        .is_some());

    manager
        .commit_stream("instagram_relationships", StreamState::new())
        .await;
    assert!(manager
        .stream_state("instagram_relationships")
        .await
        .unwrap()
        .bookmark
        .is_none());
}

#[tokio::test]
async fn test_clone_shares_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();

    clone
        .commit_stream("twitter_metrics", StreamState::with_replication_value(json!("2024-03-01")))
        .await;

    assert_eq!(
        mark(&manager, "twitter_metrics").await,
        Some(json!("2024-03-01"))
    );
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::new(&path);
    manager
        .commit_stream(
            "pinterest_account_stats",
            StreamState::with_replication_value(json!("2024-05-01")),
        )
        .await;
    manager.checkpoint().await.unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let contents = std::fs::read_to_string(&path).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        saved,
        json!({"pinterest_account_stats": {"replication_key_value": "2024-05-01"}})
    );

    let loaded = StateManager::from_file(&path).unwrap();
    assert_eq!(
        mark(&loaded, "pinterest_account_stats").await,
        Some(json!("2024-05-01"))
    );
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("missing.json")).unwrap();
    assert!(manager.state().await.streams.is_empty());
}

#[test]
fn test_load_invalid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "not valid json").unwrap();

    let result = StateManager::from_file(&path);
    assert!(matches!(result, Err(crate::Error::State { .. })));
}

#[tokio::test]
async fn test_save_in_memory_noop() {
    let manager = StateManager::in_memory();
    manager
        .commit_stream("a", StreamState::with_replication_value(json!(1)))
        .await;
    manager.save().await.unwrap();
}

#[tokio::test]
async fn test_to_value() {
    let manager = StateManager::in_memory();
    manager
        .commit_stream("a", StreamState::with_replication_value(json!("2024-01-01")))
        .await;
    assert_eq!(
        manager.to_value().await.unwrap(),
        json!({"a": {"replication_key_value": "2024-01-01"}})
    );
}
