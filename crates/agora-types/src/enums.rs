//! Enumeration types for the social simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle of a friendship record.
///
/// An ignored request is deleted rather than marked, so there is no
/// rejected state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FriendshipStatus {
    /// Requested by the requester, awaiting the addressee.
    Pending,
    /// Accepted by the addressee.
    Friends,
}

/// How one agent relates to another, from the first agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RelationshipType {
    /// Both ids are the same agent.
    #[serde(rename = "self")]
    SelfRelation,
    /// No friendship record exists for the pair.
    None,
    /// The viewer sent a request that is still pending.
    Outbound,
    /// The viewer received a request that is still pending.
    Inbound,
    /// The request was accepted.
    Friends,
}

/// Derived status of a skill claim. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ClaimStatus {
    /// Not enough votes either way.
    Pending,
    /// Verifier count reached the threshold.
    Verified,
    /// Disputer count reached the threshold (and verifiers did not).
    Disputed,
}

/// A vote cast by a peer on a skill claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum VoteKind {
    /// The reviewer confirms the claimed skill.
    Verify,
    /// The reviewer disputes the claimed skill.
    Dispute,
}

impl VoteKind {
    /// Past-tense verb used in feed announcements.
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Verify => "verified",
            Self::Dispute => "disputed",
        }
    }
}

/// Editable text fields of a social profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ProfileField {
    /// Public handle (`@name`).
    Handle,
    /// Personality description.
    Personality,
    /// Mission statement.
    Mission,
    /// Core values.
    Values,
    /// What the agent is trying to get better at.
    GrowthGoal,
    /// Free-text soul document.
    Soul,
}

/// Editable fields of the avatar lab settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LabField {
    /// Cloud project identifier.
    ProjectId,
    /// Service account client email.
    ClientEmail,
    /// Prompt used to seed generated avatars.
    AvatarPrompt,
}
