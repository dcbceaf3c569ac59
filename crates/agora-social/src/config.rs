//! Tunable parameters for the autonomous stepper.
//!
//! Probabilities are expressed as [`Decimal`] fractions in configuration
//! (e.g. `0.46`) and compiled to integer basis points (out of 10 000) before
//! use, so every roll is an integer comparison.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use crate::error::SocialError;

/// Number of basis points in a whole (probability 1.0).
pub const BASIS_POINTS: u32 = 10_000;

/// Relative weights of the four autonomous behaviours.
///
/// Weights need not sum to one; each branch is chosen with probability
/// `weight / sum(weights)`. The defaults reproduce cumulative cut-points of
/// 0.46, 0.72 and 0.90.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepWeights {
    /// A random agent publishes a status post.
    #[serde(default = "default_status_post")]
    pub status_post: Decimal,
    /// Accept a pending request or send a new one.
    #[serde(default = "default_friendship")]
    pub friendship: Decimal,
    /// A peer reviews a pending skill claim.
    #[serde(default = "default_claim_review")]
    pub claim_review: Decimal,
    /// An agent refines its soul document toward its growth goal.
    #[serde(default = "default_growth_update")]
    pub growth_update: Decimal,
}

impl Default for StepWeights {
    fn default() -> Self {
        Self {
            status_post: default_status_post(),
            friendship: default_friendship(),
            claim_review: default_claim_review(),
            growth_update: default_growth_update(),
        }
    }
}

/// Parameters of the autonomous stepper beyond branch selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutonomyConfig {
    /// Branch weights.
    #[serde(default)]
    pub weights: StepWeights,
    /// Within the friendship branch, chance of accepting a pending request
    /// (when one exists) instead of sending a new one.
    #[serde(default = "default_accept_pending_chance")]
    pub accept_pending_chance: Decimal,
    /// Within the claim-review branch, chance that the vote is a verify.
    #[serde(default = "default_verify_chance")]
    pub verify_chance: Decimal,
    /// Attempts at finding two unrelated agents before giving up.
    #[serde(default = "default_friend_attempts")]
    pub friend_attempts: u32,
}

impl Default for AutonomyConfig {
    fn default() -> Self {
        Self {
            weights: StepWeights::default(),
            accept_pending_chance: default_accept_pending_chance(),
            verify_chance: default_verify_chance(),
            friend_attempts: default_friend_attempts(),
        }
    }
}

/// [`AutonomyConfig`] with every probability converted to basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledAutonomy {
    /// Status-post weight in basis points.
    pub status_post: u32,
    /// Friendship weight in basis points.
    pub friendship: u32,
    /// Claim-review weight in basis points.
    pub claim_review: u32,
    /// Growth-update weight in basis points.
    pub growth_update: u32,
    /// Accept-pending chance in basis points.
    pub accept_pending_chance: u32,
    /// Verify chance in basis points.
    pub verify_chance: u32,
    /// Retry budget for finding an unrelated pair.
    pub friend_attempts: u32,
}

impl AutonomyConfig {
    /// Validate and convert to basis points.
    ///
    /// # Errors
    ///
    /// Returns [`SocialError::InvalidConfig`] if any probability is negative
    /// or above one, a weight is negative, or all weights are zero.
    pub fn compile(&self) -> Result<CompiledAutonomy, SocialError> {
        let status_post = weight_to_bp("status_post", self.weights.status_post)?;
        let friendship = weight_to_bp("friendship", self.weights.friendship)?;
        let claim_review = weight_to_bp("claim_review", self.weights.claim_review)?;
        let growth_update = weight_to_bp("growth_update", self.weights.growth_update)?;

        let total = status_post
            .checked_add(friendship)
            .and_then(|t| t.checked_add(claim_review))
            .and_then(|t| t.checked_add(growth_update))
            .ok_or_else(|| SocialError::InvalidConfig {
                reason: String::from("step weights overflow"),
            })?;
        if total == 0 {
            return Err(SocialError::InvalidConfig {
                reason: String::from("at least one step weight must be positive"),
            });
        }

        Ok(CompiledAutonomy {
            status_post,
            friendship,
            claim_review,
            growth_update,
            accept_pending_chance: chance_to_bp(
                "accept_pending_chance",
                self.accept_pending_chance,
            )?,
            verify_chance: chance_to_bp("verify_chance", self.verify_chance)?,
            friend_attempts: self.friend_attempts,
        })
    }
}

impl Default for CompiledAutonomy {
    fn default() -> Self {
        // Defaults are known-valid; mirror them without the fallible path.
        Self {
            status_post: 4_600,
            friendship: 2_600,
            claim_review: 1_800,
            growth_update: 1_000,
            accept_pending_chance: 5_000,
            verify_chance: 8_000,
            friend_attempts: default_friend_attempts(),
        }
    }
}

fn to_bp(value: Decimal) -> Option<u32> {
    value
        .checked_mul(Decimal::from(BASIS_POINTS))
        .map(|v| v.round())
        .and_then(|v| v.to_u32())
}

fn weight_to_bp(name: &str, value: Decimal) -> Result<u32, SocialError> {
    to_bp(value).ok_or_else(|| SocialError::InvalidConfig {
        reason: format!("weight {name} must be a non-negative number, got {value}"),
    })
}

fn chance_to_bp(name: &str, value: Decimal) -> Result<u32, SocialError> {
    match to_bp(value) {
        Some(bp) if bp <= BASIS_POINTS => Ok(bp),
        _ => Err(SocialError::InvalidConfig {
            reason: format!("{name} must be between 0 and 1, got {value}"),
        }),
    }
}

fn default_status_post() -> Decimal {
    Decimal::new(46, 2)
}

fn default_friendship() -> Decimal {
    Decimal::new(26, 2)
}

fn default_claim_review() -> Decimal {
    Decimal::new(18, 2)
}

fn default_growth_update() -> Decimal {
    Decimal::new(10, 2)
}

fn default_accept_pending_chance() -> Decimal {
    Decimal::new(5, 1)
}

fn default_verify_chance() -> Decimal {
    Decimal::new(8, 1)
}

const fn default_friend_attempts() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_compile_to_original_cut_points() {
        let compiled = AutonomyConfig::default().compile();
        assert_eq!(compiled.ok(), Some(CompiledAutonomy::default()));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut config = AutonomyConfig::default();
        config.weights.friendship = Decimal::new(-1, 1);
        assert!(config.compile().is_err());
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let config = AutonomyConfig {
            weights: StepWeights {
                status_post: Decimal::ZERO,
                friendship: Decimal::ZERO,
                claim_review: Decimal::ZERO,
                growth_update: Decimal::ZERO,
            },
            ..AutonomyConfig::default()
        };
        assert!(config.compile().is_err());
    }

    #[test]
    fn chance_above_one_is_rejected() {
        let config = AutonomyConfig {
            verify_chance: Decimal::new(15, 1),
            ..AutonomyConfig::default()
        };
        assert!(config.compile().is_err());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let parsed: Result<AutonomyConfig, _> =
            serde_json::from_str(r#"{"weights": {"status_post": 0.5}, "friend_attempts": 3}"#);
        let config = parsed.ok().unwrap_or_default();
        assert_eq!(config.weights.status_post, Decimal::new(5, 1));
        assert_eq!(config.weights.friendship, Decimal::new(26, 2));
        assert_eq!(config.friend_attempts, 3);
    }
}
