//! Friendship queries.
//!
//! Every mutator maintains "at most one record per unordered pair", so the
//! queries here take the first match and do not re-validate.

use agora_types::{AgentId, Friendship, FriendshipStatus, RelationshipType};

/// Find the record connecting `a` and `b`, in either direction.
pub fn find_friendship<'a>(
    friendships: &'a [Friendship],
    a: &AgentId,
    b: &AgentId,
) -> Option<&'a Friendship> {
    friendships.iter().find(|f| f.connects(a, b))
}

/// Classify how `actor` relates to `other`.
pub fn relationship_type(
    friendships: &[Friendship],
    actor: &AgentId,
    other: &AgentId,
) -> RelationshipType {
    if actor == other {
        return RelationshipType::SelfRelation;
    }
    match find_friendship(friendships, actor, other) {
        None => RelationshipType::None,
        Some(f) if f.status == FriendshipStatus::Friends => RelationshipType::Friends,
        Some(f) if f.requester_id == *actor => RelationshipType::Outbound,
        Some(_) => RelationshipType::Inbound,
    }
}

/// Agents that are confirmed friends of `agent`.
pub fn friends_of<'a>(
    friendships: &'a [Friendship],
    agent: &'a AgentId,
) -> impl Iterator<Item = &'a AgentId> {
    friendships
        .iter()
        .filter(move |f| f.status == FriendshipStatus::Friends && f.involves(agent))
        .map(move |f| {
            if f.requester_id == *agent {
                &f.addressee_id
            } else {
                &f.requester_id
            }
        })
}

/// Pending requests addressed to `agent`.
pub fn pending_inbound<'a>(
    friendships: &'a [Friendship],
    agent: &'a AgentId,
) -> impl Iterator<Item = &'a Friendship> {
    friendships
        .iter()
        .filter(move |f| f.status == FriendshipStatus::Pending && f.addressee_id == *agent)
}
