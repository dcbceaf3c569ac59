//! Interactive state transitions.
//!
//! Each function takes the current state and returns the next one; the
//! input is never modified in place. An action that is not valid for the
//! current state (no actor, self-friendship, double vote, empty post, ...)
//! returns an unchanged copy. These are treated as caller misuse, since a
//! UI normally hides them, so they are logged at `debug` and not reported
//! as errors.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use agora_types::{
    AgentId, ClaimId, FeedPost, Friendship, FriendshipId, FriendshipStatus, IntegrationAccount,
    KnowledgeSummary, LabField, LearningLog, LearningLogId, PostId, ProfileField, RosterAgent,
    SkillClaim, SocialState, SourceCitation, VoteKind,
};

use crate::claims::can_review;
use crate::feed::{display_handle, new_post, publish, record_learning};
use crate::hydrate::hydrate;
use crate::relationship::find_friendship;

/// The current actor, if set and known.
fn acting(state: &SocialState) -> Option<AgentId> {
    state
        .current_actor_id
        .clone()
        .filter(|id| state.knows(id))
}

/// Switch the acting identity.
///
/// Only the pointer fields change. `focus_agent_id` and the lab target are
/// backfilled with the new actor only when they were unset.
pub fn change_actor(state: &SocialState, agent: &AgentId) -> SocialState {
    if !state.knows(agent) {
        debug!(agent = %agent, "change_actor rejected: unknown agent");
        return state.clone();
    }
    let mut next = state.clone();
    next.current_actor_id = Some(agent.clone());
    if next.focus_agent_id.is_none() {
        next.focus_agent_id = Some(agent.clone());
    }
    if next.lab.target_agent_id.is_none() {
        next.lab.target_agent_id = Some(agent.clone());
    }
    next
}

/// Switch which profile is being edited.
pub fn change_focus(state: &SocialState, agent: &AgentId) -> SocialState {
    if !state.knows(agent) {
        debug!(agent = %agent, "change_focus rejected: unknown agent");
        return state.clone();
    }
    let mut next = state.clone();
    next.focus_agent_id = Some(agent.clone());
    next
}

/// Edit one text field of the focused agent's profile.
pub fn update_profile_field(state: &SocialState, field: ProfileField, value: &str) -> SocialState {
    let Some(focus) = state.focus_agent_id.clone() else {
        debug!("update_profile_field rejected: no focused agent");
        return state.clone();
    };
    let mut next = state.clone();
    let Some(profile) = next.profiles.get_mut(&focus) else {
        debug!(agent = %focus, "update_profile_field rejected: focused agent has no profile");
        return state.clone();
    };
    let slot = match field {
        ProfileField::Handle => &mut profile.handle,
        ProfileField::Personality => &mut profile.personality,
        ProfileField::Mission => &mut profile.mission,
        ProfileField::Values => &mut profile.values,
        ProfileField::GrowthGoal => &mut profile.growth_goal,
        ProfileField::Soul => &mut profile.soul,
    };
    value.clone_into(slot);
    next
}

/// Publish a post by the current actor.
pub fn submit_post(state: &SocialState, content: &str, now: DateTime<Utc>) -> SocialState {
    let content = content.trim();
    if content.is_empty() {
        debug!("submit_post rejected: empty content");
        return state.clone();
    }
    let Some(actor) = acting(state) else {
        debug!("submit_post rejected: no actor");
        return state.clone();
    };
    let mut next = state.clone();
    publish(
        &mut next,
        new_post(PostId::new(), actor, content.to_owned(), now, None),
    );
    next
}

/// Like or unlike a post as the current actor.
pub fn toggle_like(state: &SocialState, post: PostId) -> SocialState {
    let Some(actor) = acting(state) else {
        debug!("toggle_like rejected: no actor");
        return state.clone();
    };
    let mut next = state.clone();
    let Some(target) = next.posts.iter_mut().find(|p| p.id == post) else {
        debug!(post = %post, "toggle_like rejected: unknown post");
        return state.clone();
    };
    if !target.likes.remove(&actor) {
        target.likes.insert(actor);
    }
    next
}

/// Send a friend request from the current actor to `target`.
///
/// Rejected if the actor is missing, `target` is the actor or unknown, or
/// the pair already has a record in either direction.
pub fn send_friend_request(state: &SocialState, target: &AgentId, now: DateTime<Utc>) -> SocialState {
    let Some(actor) = acting(state) else {
        debug!("send_friend_request rejected: no actor");
        return state.clone();
    };
    if actor == *target || !state.knows(target) {
        debug!(actor = %actor, target = %target, "send_friend_request rejected: invalid target");
        return state.clone();
    }
    if find_friendship(&state.friendships, &actor, target).is_some() {
        debug!(actor = %actor, target = %target, "send_friend_request rejected: relationship exists");
        return state.clone();
    }
    let mut next = state.clone();
    next.friendships.push(pending_request(FriendshipId::new(), actor, target.clone(), now));
    next
}

/// Build a pending friendship record.
pub(crate) const fn pending_request(
    id: FriendshipId,
    requester_id: AgentId,
    addressee_id: AgentId,
    now: DateTime<Utc>,
) -> Friendship {
    Friendship {
        id,
        requester_id,
        addressee_id,
        status: FriendshipStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

/// Index of a pending request addressed to the current actor.
fn inbound_index(state: &SocialState, request: FriendshipId) -> Option<usize> {
    let actor = acting(state)?;
    state.friendships.iter().position(|f| {
        f.id == request && f.status == FriendshipStatus::Pending && f.addressee_id == actor
    })
}

/// Accept a pending request addressed to the current actor.
pub fn accept_friend_request(
    state: &SocialState,
    request: FriendshipId,
    now: DateTime<Utc>,
) -> SocialState {
    let Some(idx) = inbound_index(state, request) else {
        debug!(request = %request, "accept_friend_request rejected: not a pending inbound request");
        return state.clone();
    };
    let mut next = state.clone();
    if let Some(record) = next.friendships.get_mut(idx) {
        record.status = FriendshipStatus::Friends;
        record.updated_at = now;
    }
    next
}

/// Ignore (delete) a pending request addressed to the current actor.
pub fn ignore_friend_request(state: &SocialState, request: FriendshipId) -> SocialState {
    let Some(idx) = inbound_index(state, request) else {
        debug!(request = %request, "ignore_friend_request rejected: not a pending inbound request");
        return state.clone();
    };
    let mut next = state.clone();
    if idx < next.friendships.len() {
        next.friendships.remove(idx);
    }
    next
}

/// Record `voter`'s vote on a claim and announce it.
///
/// Shared by the interactive action and the autonomous stepper. Returns
/// `None` if the vote is not allowed.
pub(crate) fn cast_vote(
    state: &SocialState,
    claim: ClaimId,
    voter: &AgentId,
    vote: VoteKind,
    post_id: PostId,
    now: DateTime<Utc>,
) -> Option<SocialState> {
    let existing = state.claim(claim)?;
    if !can_review(existing, voter) {
        return None;
    }
    let mut next = state.clone();
    let target = next.claims.iter_mut().find(|c| c.id == claim)?;
    match vote {
        VoteKind::Verify => target.verified_by.insert(voter.clone()),
        VoteKind::Dispute => target.disputed_by.insert(voter.clone()),
    };
    let content = format!(
        "{} {} {}'s claim on {}.",
        display_handle(state, voter),
        vote.verb(),
        display_handle(state, &target.agent_id),
        target.skill
    );
    let source = Some(target.source.clone());
    publish(&mut next, new_post(post_id, voter.clone(), content, now, source));
    Some(next)
}

/// Vote on a skill claim as the current actor.
///
/// Rejects voting on one's own claim and voting twice (with either kind).
pub fn vote_on_claim(
    state: &SocialState,
    claim: ClaimId,
    vote: VoteKind,
    now: DateTime<Utc>,
) -> SocialState {
    let Some(actor) = acting(state) else {
        debug!("vote_on_claim rejected: no actor");
        return state.clone();
    };
    cast_vote(state, claim, &actor, vote, PostId::new(), now).unwrap_or_else(|| {
        debug!(actor = %actor, claim = %claim, "vote_on_claim rejected: not eligible");
        state.clone()
    })
}

/// Apply a successful knowledge lookup for the current actor.
///
/// Creates a pending skill claim, a learning log entry and a post citing
/// the source. The lookup itself happens outside the reducer.
pub fn apply_learning(
    state: &SocialState,
    topic: &str,
    knowledge: &KnowledgeSummary,
    now: DateTime<Utc>,
) -> SocialState {
    let topic = topic.trim();
    let Some(actor) = acting(state) else {
        debug!("apply_learning rejected: no actor");
        return state.clone();
    };
    if topic.is_empty() {
        debug!("apply_learning rejected: empty topic");
        return state.clone();
    }

    let source = SourceCitation {
        title: knowledge.title.clone(),
        url: knowledge.url.clone(),
    };
    let mut next = state.clone();
    next.claims.insert(
        0,
        SkillClaim {
            id: ClaimId::new(),
            agent_id: actor.clone(),
            topic: topic.to_owned(),
            skill: knowledge.title.clone(),
            summary: knowledge.summary.clone(),
            source: source.clone(),
            created_at: now,
            verified_by: BTreeSet::new(),
            disputed_by: BTreeSet::new(),
        },
    );
    record_learning(
        &mut next,
        LearningLog {
            id: LearningLogId::new(),
            agent_id: actor.clone(),
            topic: topic.to_owned(),
            summary: knowledge.summary.clone(),
            source: source.clone(),
            created_at: now,
        },
    );
    let content = format!(
        "Studied \"{topic}\" and picked up {}. Peers, please review my claim.",
        knowledge.title
    );
    publish(&mut next, new_post(PostId::new(), actor, content, now, Some(source)));
    next
}

/// Edit a text field of the avatar lab settings.
pub fn update_lab_field(state: &SocialState, field: LabField, value: &str) -> SocialState {
    let mut next = state.clone();
    let slot = match field {
        LabField::ProjectId => &mut next.lab.project_id,
        LabField::ClientEmail => &mut next.lab.client_email,
        LabField::AvatarPrompt => &mut next.lab.avatar_prompt,
    };
    value.trim().clone_into(slot);
    next
}

/// Point the avatar lab at another agent.
pub fn set_lab_target(state: &SocialState, agent: &AgentId) -> SocialState {
    if !state.knows(agent) {
        debug!(agent = %agent, "set_lab_target rejected: unknown agent");
        return state.clone();
    }
    let mut next = state.clone();
    next.lab.target_agent_id = Some(agent.clone());
    next
}

/// Mark the lab connected or disconnected.
pub fn set_lab_connected(state: &SocialState, connected: bool) -> SocialState {
    let mut next = state.clone();
    next.lab.connected = connected;
    next
}

/// Post a status line about connected integration accounts.
///
/// The lab is marked connected when any account is connected. No post is
/// made when there is no actor or no connected account.
pub fn announce_integrations(
    state: &SocialState,
    accounts: &[IntegrationAccount],
    now: DateTime<Utc>,
) -> SocialState {
    let connected: Vec<&IntegrationAccount> =
        accounts.iter().filter(|a| a.is_connected()).collect();
    let Some(actor) = acting(state) else {
        debug!("announce_integrations rejected: no actor");
        return state.clone();
    };
    if connected.is_empty() {
        debug!(accounts = accounts.len(), "announce_integrations skipped: nothing connected");
        return state.clone();
    }

    let labels: Vec<String> = connected
        .iter()
        .map(|a| {
            a.display_name.as_ref().map_or_else(
                || a.email.clone(),
                |name| format!("{name} <{}>", a.email),
            )
        })
        .collect();
    let scope_count: usize = connected.iter().map(|a| a.scopes.len()).sum();
    let content = format!(
        "Connected accounts: {} ({scope_count} scopes granted).",
        labels.join(", ")
    );

    let mut next = state.clone();
    next.lab.connected = true;
    publish(&mut next, new_post(PostId::new(), actor, content, now, None));
    next
}

/// Clear the feed and re-hydrate, which brings back the seed posts.
pub fn reset_feed(state: &SocialState, roster: &[RosterAgent], now: DateTime<Utc>) -> SocialState {
    let mut cleared = state.clone();
    cleared.posts = Vec::<FeedPost>::new();
    hydrate(&cleared, roster, now)
}

#[cfg(test)]
mod tests {
    use agora_types::{ClaimStatus, RelationshipType};

    use super::*;
    use crate::claims::claim_status;
    use crate::relationship::relationship_type;

    fn roster(ids: &[&str]) -> Vec<RosterAgent> {
        ids.iter()
            .map(|id| RosterAgent {
                id: AgentId::from(*id),
                name: id.to_uppercase(),
                description: None,
                model: None,
                enabled: true,
                skills: Vec::new(),
            })
            .collect()
    }

    fn base(ids: &[&str]) -> SocialState {
        hydrate(&SocialState::new(), &roster(ids), Utc::now())
    }

    fn as_actor(state: &SocialState, id: &str) -> SocialState {
        change_actor(state, &AgentId::from(id))
    }

    fn knowledge() -> KnowledgeSummary {
        KnowledgeSummary {
            title: String::from("Graph theory"),
            summary: String::from("The study of graphs."),
            url: String::from("https://en.wikipedia.org/wiki/Graph_theory"),
        }
    }

    #[test]
    fn change_actor_backfills_only_unset_pointers() {
        let mut state = base(&["a", "b"]);
        state.lab.target_agent_id = None;
        let next = as_actor(&state, "b");
        assert_eq!(next.current_actor_id, Some(AgentId::from("b")));
        assert_eq!(next.focus_agent_id, Some(AgentId::from("a")));
        assert_eq!(next.lab.target_agent_id, Some(AgentId::from("b")));
        assert_eq!(next.posts, state.posts);
    }

    #[test]
    fn change_actor_rejects_unknown() {
        let state = base(&["a"]);
        assert_eq!(as_actor(&state, "ghost"), state);
    }

    #[test]
    fn profile_edit_targets_focus_only() {
        let state = change_focus(&base(&["a", "b"]), &AgentId::from("b"));
        let next = update_profile_field(&state, ProfileField::Mission, "Ship it");
        assert_eq!(
            next.profiles.get(&AgentId::from("b")).map(|p| p.mission.as_str()),
            Some("Ship it")
        );
        assert_eq!(next.profiles.get(&AgentId::from("a")), state.profiles.get(&AgentId::from("a")));
    }

    #[test]
    fn submit_post_trims_and_rejects_empty() {
        let state = base(&["a"]);
        let now = Utc::now();
        assert_eq!(submit_post(&state, "   ", now), state);
        let next = submit_post(&state, "  hello  ", now);
        assert_eq!(next.posts.first().map(|p| p.content.as_str()), Some("hello"));
        assert_eq!(next.posts.first().map(|p| p.author_id.as_str()), Some("a"));
    }

    #[test]
    fn submit_post_requires_actor() {
        let mut state = base(&["a"]);
        state.current_actor_id = None;
        assert_eq!(submit_post(&state, "hello", Utc::now()), state);
    }

    #[test]
    fn toggle_like_twice_restores_likes() {
        let state = base(&["a", "b"]);
        let post = state.posts.first().map(|p| p.id).unwrap_or_default();
        let liked = toggle_like(&state, post);
        assert_eq!(liked.post(post).map(|p| p.likes.len()), Some(1));
        let unliked = toggle_like(&liked, post);
        assert_eq!(unliked.post(post).map(|p| p.likes.clone()), state.post(post).map(|p| p.likes.clone()));
    }

    #[test]
    fn friend_request_accept_flow() {
        let now = Utc::now();
        let a = AgentId::from("a");
        let b = AgentId::from("b");
        let state = as_actor(&base(&["a", "b"]), "a");
        let sent = send_friend_request(&state, &b, now);
        assert_eq!(relationship_type(&sent.friendships, &a, &b), RelationshipType::Outbound);

        let request = sent.friendships.first().map(|f| f.id).unwrap_or_default();
        // The requester cannot accept its own request.
        assert_eq!(accept_friend_request(&sent, request, now), sent);

        let accepted = accept_friend_request(&as_actor(&sent, "b"), request, now);
        assert_eq!(relationship_type(&accepted.friendships, &a, &b), RelationshipType::Friends);
        assert_eq!(relationship_type(&accepted.friendships, &b, &a), RelationshipType::Friends);
    }

    #[test]
    fn friend_request_rejects_self_and_duplicates() {
        let now = Utc::now();
        let state = as_actor(&base(&["a", "b"]), "a");
        assert_eq!(send_friend_request(&state, &AgentId::from("a"), now), state);

        let sent = send_friend_request(&state, &AgentId::from("b"), now);
        assert_eq!(send_friend_request(&sent, &AgentId::from("b"), now), sent);
        let reverse = send_friend_request(&as_actor(&sent, "b"), &AgentId::from("a"), now);
        assert_eq!(reverse.friendships.len(), 1);
    }

    #[test]
    fn ignore_deletes_request() {
        let now = Utc::now();
        let sent = send_friend_request(&as_actor(&base(&["a", "b"]), "a"), &AgentId::from("b"), now);
        let request = sent.friendships.first().map(|f| f.id).unwrap_or_default();
        let ignored = ignore_friend_request(&as_actor(&sent, "b"), request);
        assert!(ignored.friendships.is_empty());
    }

    #[test]
    fn voting_flow_and_rejections() {
        let now = Utc::now();
        let state = apply_learning(&as_actor(&base(&["x", "y", "z"]), "x"), "graphs", &knowledge(), now);
        let claim = state.claims.first().map(|c| c.id).unwrap_or_default();

        // Claimant cannot vote.
        assert_eq!(vote_on_claim(&state, claim, VoteKind::Verify, now), state);

        let once = vote_on_claim(&as_actor(&state, "y"), claim, VoteKind::Verify, now);
        // Second vote of either kind by the same reviewer is rejected.
        assert_eq!(vote_on_claim(&once, claim, VoteKind::Dispute, now), once);

        let twice = vote_on_claim(&as_actor(&once, "z"), claim, VoteKind::Verify, now);
        assert_eq!(twice.claim(claim).map(claim_status), Some(ClaimStatus::Verified));
        assert!(twice.posts.first().is_some_and(|p| p.content.contains("verified")));
    }

    #[test]
    fn learning_creates_claim_log_and_post() {
        let now = Utc::now();
        let state = as_actor(&base(&["a"]), "a");
        let next = apply_learning(&state, "  graphs ", &knowledge(), now);
        assert_eq!(next.claims.len(), 1);
        assert_eq!(next.learning_logs.first().map(|l| l.topic.as_str()), Some("graphs"));
        assert!(next.posts.first().is_some_and(|p| p.source.is_some()));
        assert_eq!(next.claims.first().map(claim_status), Some(ClaimStatus::Pending));
    }

    #[test]
    fn integrations_announcement_marks_lab_connected() {
        let state = base(&["a"]);
        let accounts = vec![IntegrationAccount {
            id: String::from("1"),
            email: String::from("ops@example.com"),
            display_name: Some(String::from("Ops")),
            status: String::from("connected"),
            scopes: vec![String::from("calendar"), String::from("mail")],
        }];
        let next = announce_integrations(&state, &accounts, Utc::now());
        assert!(next.lab.connected);
        assert!(next.posts.first().is_some_and(|p| p.content.contains("Ops <ops@example.com>")));
    }

    #[test]
    fn lab_fields_are_trimmed() {
        let state = base(&["a"]);
        let next = update_lab_field(&state, LabField::ProjectId, "  proj-1 ");
        assert_eq!(next.lab.project_id, "proj-1");
    }

    #[test]
    fn reset_feed_restores_seed_posts() {
        let now = Utc::now();
        let r = roster(&["a", "b"]);
        let state = submit_post(&hydrate(&SocialState::new(), &r, now), "extra", now);
        let reset = reset_feed(&state, &r, now);
        assert_eq!(reset.posts.len(), 2);
    }
}
