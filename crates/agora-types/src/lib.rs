//! Shared type definitions for the Agora social simulation.
//!
//! This crate is the single source of truth for the social state shape.
//! Types flow downstream to `TypeScript` via `ts-rs` for the dashboard that
//! renders the feed.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers (registry-owned [`AgentId`], UUID wrappers for the rest)
//! - [`enums`] -- Friendship, relationship, claim, vote, and edit-field enums
//! - [`structs`] -- Roster records, profiles, posts, friendships, claims, logs, the aggregate state

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ClaimStatus, FriendshipStatus, LabField, ProfileField, RelationshipType, VoteKind};
pub use ids::{AgentId, ClaimId, FriendshipId, LearningLogId, PostId};
pub use structs::{
    FeedPost, Friendship, IntegrationAccount, KnowledgeSummary, LabState, LearningLog,
    RosterAgent, SkillClaim, SocialProfile, SocialState, SourceCitation,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Writes `.ts` files to the `bindings/` directory relative to the
        // crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::PostId::export_all();
        let _ = crate::ids::FriendshipId::export_all();
        let _ = crate::ids::ClaimId::export_all();
        let _ = crate::ids::LearningLogId::export_all();

        // Enums
        let _ = crate::enums::FriendshipStatus::export_all();
        let _ = crate::enums::RelationshipType::export_all();
        let _ = crate::enums::ClaimStatus::export_all();
        let _ = crate::enums::VoteKind::export_all();
        let _ = crate::enums::ProfileField::export_all();
        let _ = crate::enums::LabField::export_all();

        // Structs
        let _ = crate::structs::RosterAgent::export_all();
        let _ = crate::structs::IntegrationAccount::export_all();
        let _ = crate::structs::KnowledgeSummary::export_all();
        let _ = crate::structs::SourceCitation::export_all();
        let _ = crate::structs::SocialProfile::export_all();
        let _ = crate::structs::FeedPost::export_all();
        let _ = crate::structs::Friendship::export_all();
        let _ = crate::structs::SkillClaim::export_all();
        let _ = crate::structs::LearningLog::export_all();
        let _ = crate::structs::LabState::export_all();
        let _ = crate::structs::SocialState::export_all();
    }
}
