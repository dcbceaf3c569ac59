//! Core entity structs for the social simulation.
//!
//! Everything the simulation owns lives inside one aggregate
//! [`SocialState`], persisted as a single JSON document. The roster types
//! ([`RosterAgent`], [`IntegrationAccount`]) are owned by external services
//! and only read here.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::FriendshipStatus;
use crate::ids::{AgentId, ClaimId, FriendshipId, LearningLogId, PostId};

// ---------------------------------------------------------------------------
// External records
// ---------------------------------------------------------------------------

/// An agent as known to the external agent registry, after normalization.
///
/// Optional registry fields that have a sensible default (`enabled`,
/// `skills`) are resolved once at the roster boundary; the rest stay
/// optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RosterAgent {
    /// Registry identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Free-text description, if the registry has one.
    pub description: Option<String>,
    /// Backing model name, if reported.
    pub model: Option<String>,
    /// Whether the agent participates in autonomous activity.
    pub enabled: bool,
    /// Skills advertised by the registry.
    pub skills: Vec<String>,
}

/// A connected integration account, used for display and status posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IntegrationAccount {
    /// Account identifier.
    pub id: String,
    /// Account email address.
    pub email: String,
    /// Optional human-readable label.
    pub display_name: Option<String>,
    /// Connection status as reported by the backend (e.g. `connected`).
    pub status: String,
    /// OAuth scopes granted to the account.
    pub scopes: Vec<String>,
}

impl IntegrationAccount {
    /// Whether the backend reports this account as connected.
    pub fn is_connected(&self) -> bool {
        self.status.eq_ignore_ascii_case("connected")
    }
}

/// A normalized encyclopedia lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct KnowledgeSummary {
    /// Article title.
    pub title: String,
    /// Plain-text summary, already truncated.
    pub summary: String,
    /// Canonical article URL.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Owned entities
// ---------------------------------------------------------------------------

/// A citation attached to posts, claims, and learning logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SourceCitation {
    /// Title of the cited source.
    pub title: String,
    /// Link to the cited source.
    pub url: String,
}

/// Social identity of one agent. Exactly one per known agent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct SocialProfile {
    /// Public handle, e.g. `@ops_assistant`.
    pub handle: String,
    /// Personality description.
    pub personality: String,
    /// Mission statement.
    pub mission: String,
    /// Core values.
    pub values: String,
    /// What the agent is working toward.
    pub growth_goal: String,
    /// Free-text soul document.
    pub soul: String,
    /// Seed for placeholder avatars.
    pub avatar_seed: String,
    /// Generated avatar image as a data URI.
    pub avatar_image: Option<String>,
}

/// One entry of the social feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FeedPost {
    /// Post identifier.
    pub id: PostId,
    /// Authoring agent.
    pub author_id: AgentId,
    /// Post text.
    pub content: String,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// Agents that like this post.
    #[serde(default)]
    pub likes: BTreeSet<AgentId>,
    /// Optional citation the post refers to.
    #[serde(default)]
    pub source: Option<SourceCitation>,
}

/// A friendship between two agents. At most one per unordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Friendship {
    /// Record identifier.
    pub id: FriendshipId,
    /// Agent that sent the request.
    pub requester_id: AgentId,
    /// Agent that received the request.
    pub addressee_id: AgentId,
    /// Current status.
    pub status: FriendshipStatus,
    /// When the request was sent.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Whether this record connects the unordered pair `{a, b}`.
    pub fn connects(&self, a: &AgentId, b: &AgentId) -> bool {
        (self.requester_id == *a && self.addressee_id == *b)
            || (self.requester_id == *b && self.addressee_id == *a)
    }

    /// Whether `agent` is either participant.
    pub fn involves(&self, agent: &AgentId) -> bool {
        self.requester_id == *agent || self.addressee_id == *agent
    }
}

/// An agent's claim to have learned a skill, open to peer review.
///
/// Status is derived from the vote sets and intentionally not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SkillClaim {
    /// Claim identifier.
    pub id: ClaimId,
    /// Agent making the claim.
    pub agent_id: AgentId,
    /// Topic the agent studied.
    pub topic: String,
    /// Name of the claimed skill.
    pub skill: String,
    /// What the agent learned.
    pub summary: String,
    /// Where it was learned.
    pub source: SourceCitation,
    /// When the claim was made.
    pub created_at: DateTime<Utc>,
    /// Agents that verified the claim.
    #[serde(default)]
    pub verified_by: BTreeSet<AgentId>,
    /// Agents that disputed the claim.
    #[serde(default)]
    pub disputed_by: BTreeSet<AgentId>,
}

impl SkillClaim {
    /// Whether `agent` already cast either kind of vote.
    pub fn has_voted(&self, agent: &AgentId) -> bool {
        self.verified_by.contains(agent) || self.disputed_by.contains(agent)
    }
}

/// Append-only audit record of a learning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LearningLog {
    /// Log identifier.
    pub id: LearningLogId,
    /// Agent that learned.
    pub agent_id: AgentId,
    /// Topic studied.
    pub topic: String,
    /// What was learned.
    pub summary: String,
    /// Where it was learned.
    pub source: SourceCitation,
    /// When it was learned.
    pub created_at: DateTime<Utc>,
}

/// Avatar lab settings. Configuration, not collaborative state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct LabState {
    /// Whether a cloud account is connected.
    pub connected: bool,
    /// Cloud project identifier.
    pub project_id: String,
    /// Service account email.
    pub client_email: String,
    /// Agent whose avatar is generated next.
    pub target_agent_id: Option<AgentId>,
    /// Prompt seeding the avatar renderer.
    pub avatar_prompt: String,
    /// When an avatar was last generated.
    pub last_generated_at: Option<DateTime<Utc>>,
}

impl Default for LabState {
    fn default() -> Self {
        Self {
            connected: false,
            project_id: String::new(),
            client_email: String::new(),
            target_agent_id: None,
            avatar_prompt: String::from("friendly geometric portrait, warm palette"),
            last_generated_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// The whole social simulation, persisted as one document.
///
/// Every field defaults so that partially written or older documents still
/// load. Referential integrity is restored by hydration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct SocialState {
    /// Identity used for interactive actions.
    pub current_actor_id: Option<AgentId>,
    /// Agent whose profile is being edited.
    pub focus_agent_id: Option<AgentId>,
    /// One profile per known agent.
    pub profiles: BTreeMap<AgentId, SocialProfile>,
    /// Feed, newest first.
    pub posts: Vec<FeedPost>,
    /// Friendship records.
    pub friendships: Vec<Friendship>,
    /// Skill claims, newest first.
    pub claims: Vec<SkillClaim>,
    /// Learning logs, newest first.
    pub learning_logs: Vec<LearningLog>,
    /// Avatar lab settings.
    pub lab: LabState,
}

impl SocialState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a post by id.
    pub fn post(&self, id: PostId) -> Option<&FeedPost> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Look up a claim by id.
    pub fn claim(&self, id: ClaimId) -> Option<&SkillClaim> {
        self.claims.iter().find(|c| c.id == id)
    }

    /// Look up a friendship by id.
    pub fn friendship(&self, id: FriendshipId) -> Option<&Friendship> {
        self.friendships.iter().find(|f| f.id == id)
    }

    /// Whether `agent` has a profile, i.e. is a known agent.
    pub fn knows(&self, agent: &AgentId) -> bool {
        self.profiles.contains_key(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_deserializes_to_default() {
        let state: Result<SocialState, _> = serde_json::from_str("{}");
        assert_eq!(state.ok(), Some(SocialState::default()));
    }

    #[test]
    fn friendship_connects_unordered_pair() {
        let a = AgentId::from("a");
        let b = AgentId::from("b");
        let now = Utc::now();
        let f = Friendship {
            id: FriendshipId::new(),
            requester_id: a.clone(),
            addressee_id: b.clone(),
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        assert!(f.connects(&a, &b));
        assert!(f.connects(&b, &a));
        assert!(!f.connects(&a, &AgentId::from("c")));
    }

    #[test]
    fn account_status_is_case_insensitive() {
        let account = IntegrationAccount {
            id: String::from("acct-1"),
            email: String::from("ops@example.com"),
            display_name: None,
            status: String::from("Connected"),
            scopes: Vec::new(),
        };
        assert!(account.is_connected());
    }
}
