//! HTTP collaborators for the Agora simulation.
//!
//! Three external services feed the simulation: the agent registry (the
//! roster), the integration account list, and an encyclopedia used for
//! knowledge lookups. Each client pairs an async `reqwest` call with a
//! pure extractor over the JSON body.
//!
//! # Modules
//!
//! - [`roster`] -- Agent roster with a built-in default ([`RosterClient`])
//! - [`integrations`] -- Connected cloud accounts ([`IntegrationClient`])
//! - [`knowledge`] -- Search-then-summary lookup ([`KnowledgeClient`], [`KnowledgeSource`])
//! - [`error`] -- Error types ([`LookupError`])

pub mod error;
pub mod integrations;
pub mod knowledge;
pub mod roster;

// Re-export primary types for convenience.
pub use error::LookupError;
pub use integrations::{IntegrationClient, parse_accounts};
pub use knowledge::{
    KnowledgeClient, KnowledgeSettings, KnowledgeSource, parse_search_response,
    parse_summary_response, truncate_summary,
};
pub use roster::{RosterClient, default_roster, parse_roster};
