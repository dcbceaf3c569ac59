//! Error types for the agora-social crate.
//!
//! State transitions never fail: invalid interactive actions are silent
//! no-ops and the autonomous stepper reports an idle step instead. The only
//! fallible surface is configuration.

/// Errors that can occur while preparing the social simulation.
#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    /// Stepper configuration failed validation.
    #[error("invalid social configuration: {reason}")]
    InvalidConfig {
        /// Description of what was wrong.
        reason: String,
    },
}
