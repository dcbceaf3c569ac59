//! Social state reducer for the Agora simulation.
//!
//! This crate holds the logic layer: everything that transforms a
//! [`SocialState`] without touching I/O. Persistence lives in `agora-store`,
//! network lookups in `agora-lookup`, and orchestration in `agora-sim`.
//!
//! Every transition takes the current state by reference and returns the
//! next state. Randomness is injected as a [`rand::Rng`].
//!
//! # Modules
//!
//! - [`actions`] -- Interactive mutators (posts, likes, friendships, votes, learning, lab)
//! - [`autonomous`] -- Randomized autonomous step ([`autonomous_step`])
//! - [`avatar`] -- Deterministic SVG avatars
//! - [`claims`] -- Claim status derivation ([`claim_status`])
//! - [`config`] -- Stepper weights and chances ([`AutonomyConfig`])
//! - [`error`] -- Error types ([`SocialError`])
//! - [`feed`] -- Feed and learning log caps
//! - [`hydrate`] -- Normalization against the roster ([`hydrate()`])
//! - [`profile`] -- Default profiles for new agents
//! - [`relationship`] -- Friendship queries ([`relationship_type`])
//! - [`stats`] -- Aggregate counts
//!
//! [`SocialState`]: agora_types::SocialState

pub mod actions;
pub mod autonomous;
pub mod avatar;
pub mod claims;
pub mod config;
pub mod error;
pub mod feed;
pub mod hydrate;
pub mod profile;
pub mod relationship;
pub mod stats;

// Re-export primary types at crate root for convenience.
pub use actions::{
    accept_friend_request, announce_integrations, apply_learning, change_actor, change_focus,
    ignore_friend_request, reset_feed, send_friend_request, set_lab_connected, set_lab_target,
    submit_post, toggle_like, update_lab_field, update_profile_field, vote_on_claim,
};
pub use autonomous::{
    StepBranch, StepOutcome, StepReport, WeightedTable, autonomous_step, retry_bounded,
};
pub use avatar::{apply_generated_avatar, generate_avatar};
pub use claims::{CLAIM_THRESHOLD, claim_status};
pub use config::{AutonomyConfig, CompiledAutonomy, StepWeights};
pub use error::SocialError;
pub use feed::{MAX_FEED_POSTS, MAX_LEARNING_LOGS};
pub use hydrate::hydrate;
pub use relationship::{find_friendship, friends_of, pending_inbound, relationship_type};
pub use stats::{SocialStats, social_stats};
