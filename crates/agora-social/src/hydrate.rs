//! Normalizing a (possibly stale) social state against the current roster.
//!
//! Hydration runs on load and on every roster change. It is a pure
//! function: given the same previous state, roster, and timestamp it always
//! produces the same result, including the seed posts it may create.
//!
//! After hydration:
//! - every roster agent has a profile and no other profile exists,
//! - every post, like, friendship, claim, vote and log references a roster
//!   agent,
//! - there is at most one friendship per unordered pair and none with
//!   itself,
//! - no voter appears in both vote sets of a claim, and no claimant votes
//!   on its own claim,
//! - `current_actor_id`, `focus_agent_id` and a set lab target resolve to a
//!   roster agent,
//! - the feed and learning log are within their caps.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use agora_types::{AgentId, Friendship, PostId, RosterAgent, SocialState};

use crate::feed::{MAX_LEARNING_LOGS, cap_feed, new_post};
use crate::profile::default_profile;

/// Number of agents that get a seed post when the feed is empty.
pub const SEED_POST_COUNT: usize = 3;

/// Spacing between consecutive seed posts, in minutes.
pub const SEED_POST_SPACING_MINUTES: i64 = 7;

/// Produce a normalized state for `roster` from `previous`.
pub fn hydrate(previous: &SocialState, roster: &[RosterAgent], now: DateTime<Utc>) -> SocialState {
    let known: BTreeSet<&AgentId> = roster.iter().map(|a| &a.id).collect();
    let is_known = |id: &AgentId| known.contains(id);

    // Profiles: keep existing ones for known agents, seed the rest.
    let mut profiles = BTreeMap::new();
    for agent in roster {
        let profile = previous
            .profiles
            .get(&agent.id)
            .cloned()
            .unwrap_or_else(|| default_profile(agent));
        profiles.insert(agent.id.clone(), profile);
    }

    // Posts: drop orphans, prune likes by unknown agents.
    let mut posts: Vec<_> = previous
        .posts
        .iter()
        .filter(|p| is_known(&p.author_id))
        .cloned()
        .map(|mut p| {
            p.likes.retain(|id| is_known(id));
            p
        })
        .collect();
    cap_feed(&mut posts);

    // Friendships: drop orphans, self-links, and duplicate pairs.
    let mut friendships: Vec<Friendship> = Vec::with_capacity(previous.friendships.len());
    for f in &previous.friendships {
        if !is_known(&f.requester_id) || !is_known(&f.addressee_id) {
            continue;
        }
        if f.requester_id == f.addressee_id {
            continue;
        }
        if friendships
            .iter()
            .any(|existing| existing.connects(&f.requester_id, &f.addressee_id))
        {
            continue;
        }
        friendships.push(f.clone());
    }

    // Claims: drop orphans, clean up vote sets.
    let claims: Vec<_> = previous
        .claims
        .iter()
        .filter(|c| is_known(&c.agent_id))
        .cloned()
        .map(|mut c| {
            let claimant = c.agent_id.clone();
            c.verified_by.retain(|id| is_known(id) && *id != claimant);
            let verifiers = c.verified_by.clone();
            c.disputed_by
                .retain(|id| is_known(id) && *id != claimant && !verifiers.contains(id));
            c
        })
        .collect();

    let mut learning_logs: Vec<_> = previous
        .learning_logs
        .iter()
        .filter(|l| is_known(&l.agent_id))
        .cloned()
        .collect();
    learning_logs.truncate(MAX_LEARNING_LOGS);

    // Pointers.
    let first = roster.first().map(|a| a.id.clone());
    let resolve = |current: Option<&AgentId>| -> Option<AgentId> {
        current
            .filter(|id| is_known(id))
            .cloned()
            .or_else(|| first.clone())
    };
    let current_actor_id = resolve(previous.current_actor_id.as_ref());
    let focus_agent_id = resolve(previous.focus_agent_id.as_ref());

    let mut lab = previous.lab.clone();
    if lab.target_agent_id.is_some() {
        lab.target_agent_id = resolve(lab.target_agent_id.as_ref());
    }

    if posts.is_empty() {
        posts = seed_posts(roster, now);
    }

    let dropped_posts = previous.posts.len().saturating_sub(posts.len());
    let dropped_friendships = previous.friendships.len().saturating_sub(friendships.len());
    debug!(
        roster = roster.len(),
        posts = posts.len(),
        dropped_posts,
        dropped_friendships,
        claims = claims.len(),
        "Hydrated social state"
    );

    SocialState {
        current_actor_id,
        focus_agent_id,
        profiles,
        posts,
        friendships,
        claims,
        learning_logs,
        lab,
    }
}

/// Deterministic "online" posts for the first [`SEED_POST_COUNT`] agents.
///
/// Agent `i` posts `(i + 1) * SEED_POST_SPACING_MINUTES` minutes before
/// `now`, so the seeded feed is in roster order, newest first.
pub fn seed_posts(roster: &[RosterAgent], now: DateTime<Utc>) -> Vec<agora_types::FeedPost> {
    roster
        .iter()
        .take(SEED_POST_COUNT)
        .zip(1_i64..)
        .map(|(agent, step)| {
            let offset = Duration::minutes(step.saturating_mul(SEED_POST_SPACING_MINUTES));
            let created_at = now.checked_sub_signed(offset).unwrap_or(now);
            new_post(
                PostId::from_name(&format!("seed:{}:{step}", agent.id)),
                agent.id.clone(),
                format!("{} is online and ready to help.", agent.name),
                created_at,
                None,
            )
        })
        .collect()
}
