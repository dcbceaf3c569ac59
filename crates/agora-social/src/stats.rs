//! Aggregate counts over the social state, for logs and dashboards.

use serde::Serialize;

use agora_types::{ClaimStatus, FriendshipStatus, SocialState};

use crate::claims::claim_status;

/// Entity counts at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SocialStats {
    /// Known agents (profiles).
    pub agents: usize,
    /// Posts in the feed.
    pub posts: usize,
    /// Accepted friendships.
    pub friendships: usize,
    /// Pending friend requests.
    pub pending_requests: usize,
    /// Claims still open for review.
    pub pending_claims: usize,
    /// Verified claims.
    pub verified_claims: usize,
    /// Disputed claims.
    pub disputed_claims: usize,
    /// Learning log entries.
    pub learning_logs: usize,
}

/// Count entities in `state`.
pub fn social_stats(state: &SocialState) -> SocialStats {
    let mut stats = SocialStats {
        agents: state.profiles.len(),
        posts: state.posts.len(),
        learning_logs: state.learning_logs.len(),
        ..SocialStats::default()
    };
    for f in &state.friendships {
        match f.status {
            FriendshipStatus::Friends => stats.friendships = stats.friendships.saturating_add(1),
            FriendshipStatus::Pending => {
                stats.pending_requests = stats.pending_requests.saturating_add(1);
            }
        }
    }
    for c in &state.claims {
        let slot = match claim_status(c) {
            ClaimStatus::Pending => &mut stats.pending_claims,
            ClaimStatus::Verified => &mut stats.verified_claims,
            ClaimStatus::Disputed => &mut stats.disputed_claims,
        };
        *slot = slot.saturating_add(1);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_has_zero_counts() {
        assert_eq!(social_stats(&SocialState::new()), SocialStats::default());
    }
}
