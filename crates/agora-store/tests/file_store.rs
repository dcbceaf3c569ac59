//! File store tests against a scratch directory.
//!
//! Each test uses its own directory under the system temp dir.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use agora_store::{FileStore, STORAGE_KEY, StateStore};
use agora_types::{AgentId, FeedPost, PostId, SocialProfile, SocialState};
use chrono::Utc;

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("agora-store-test-{}", uuid::Uuid::new_v4()))
}

fn sample_state() -> SocialState {
    let agent = AgentId::from("ops");
    let mut state = SocialState::new();
    state.current_actor_id = Some(agent.clone());
    state.profiles.insert(
        agent.clone(),
        SocialProfile {
            handle: String::from("@ops"),
            soul: String::from("Keeps the lights on."),
            ..SocialProfile::default()
        },
    );
    state.posts.push(FeedPost {
        id: PostId::new(),
        author_id: agent,
        content: String::from("hello"),
        created_at: Utc::now(),
        likes: std::collections::BTreeSet::new(),
        source: None,
    });
    state
}

#[tokio::test]
async fn missing_file_loads_as_none() {
    let store = FileStore::new(scratch_dir());
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn save_then_load_restores_state() {
    let dir = scratch_dir();
    let store = FileStore::new(&dir);
    let state = sample_state();

    store.save(&state).await.unwrap();
    assert!(dir.join(format!("{STORAGE_KEY}.json")).exists());
    assert_eq!(store.load().await.unwrap(), Some(state));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn save_leaves_no_temp_files() {
    let dir = scratch_dir();
    let store = FileStore::new(&dir);
    store.save(&sample_state()).await.unwrap();
    store.save(&SocialState::new()).await.unwrap();

    let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    assert_eq!(names, vec![format!("{STORAGE_KEY}.json")]);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn corrupt_file_loads_leniently() {
    let dir = scratch_dir();
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let store = FileStore::new(&dir);
    tokio::fs::write(
        store.path(),
        r#"{"current_actor_id": "ops", "posts": [{"broken": true}], "lab": 3}"#,
    )
    .await
    .unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.current_actor_id, Some(AgentId::from("ops")));
    assert!(loaded.posts.is_empty());
    assert_eq!(loaded.lab, SocialState::default().lab);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
