//! Feed and log bookkeeping shared by every state transition.
//!
//! The feed and the learning log are newest-first lists with hard caps.
//! Everything that adds to them goes through [`publish`] or
//! [`record_learning`] so the cap is re-applied on every insert.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use agora_types::{AgentId, FeedPost, LearningLog, PostId, SocialState, SourceCitation};

/// Maximum number of posts kept in the feed.
pub const MAX_FEED_POSTS: usize = 160;

/// Maximum number of learning log entries kept.
pub const MAX_LEARNING_LOGS: usize = 120;

/// Build a post with no likes.
pub fn new_post(
    id: PostId,
    author_id: AgentId,
    content: String,
    created_at: DateTime<Utc>,
    source: Option<SourceCitation>,
) -> FeedPost {
    FeedPost {
        id,
        author_id,
        content,
        created_at,
        likes: BTreeSet::new(),
        source,
    }
}

/// Prepend `post` to the feed and drop the oldest overflow.
pub fn publish(state: &mut SocialState, post: FeedPost) {
    state.posts.insert(0, post);
    cap_feed(&mut state.posts);
}

/// Prepend `log` to the learning log and drop the oldest overflow.
pub fn record_learning(state: &mut SocialState, log: LearningLog) {
    state.learning_logs.insert(0, log);
    state.learning_logs.truncate(MAX_LEARNING_LOGS);
}

/// Truncate the feed to [`MAX_FEED_POSTS`], keeping the newest.
pub fn cap_feed(posts: &mut Vec<FeedPost>) {
    posts.truncate(MAX_FEED_POSTS);
}

/// Posts authored by `agent`, newest first.
pub fn posts_by<'a>(state: &'a SocialState, agent: &'a AgentId) -> impl Iterator<Item = &'a FeedPost> {
    state.posts.iter().filter(move |p| p.author_id == *agent)
}

/// Display name for an agent: the profile handle, or the raw id.
pub fn display_handle(state: &SocialState, agent: &AgentId) -> String {
    state
        .profiles
        .get(agent)
        .map(|p| p.handle.clone())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| format!("@{agent}"))
}
