//! Client behaviour when the remote side is unreachable.
//!
//! Points every client at a closed local port, so no outside network is
//! needed.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use agora_lookup::{
    IntegrationClient, KnowledgeClient, KnowledgeSettings, KnowledgeSource, LookupError,
    RosterClient, default_roster,
};

const CLOSED: &str = "http://127.0.0.1:1/unreachable";

#[tokio::test]
async fn roster_falls_back_to_default() {
    let client = RosterClient::new(CLOSED, Duration::from_millis(500)).unwrap();
    assert!(client.fetch().await.is_err());
    assert_eq!(client.fetch_or_default().await, default_roster());
}

#[tokio::test]
async fn accounts_fall_back_to_empty() {
    let client = IntegrationClient::new(CLOSED, Duration::from_millis(500)).unwrap();
    assert!(client.fetch_or_empty().await.is_empty());
}

#[tokio::test]
async fn knowledge_lookup_reports_request_failure() {
    let client = KnowledgeClient::new(KnowledgeSettings {
        search_url: String::from(CLOSED),
        summary_url: String::from(CLOSED),
        timeout: Duration::from_millis(500),
        summary_max_chars: 450,
    })
    .unwrap();

    let err = client.lookup("graph theory").await.unwrap_err();
    assert!(matches!(err, LookupError::Request(_)));
    assert!(!err.user_message().is_empty());
}

#[tokio::test]
async fn blank_topic_never_hits_the_network() {
    let client = KnowledgeClient::new(KnowledgeSettings::default()).unwrap();
    assert!(matches!(client.lookup("   ").await, Err(LookupError::EmptyTopic)));
}
