//! Skill claim status derivation.
//!
//! Status is a pure function of the vote sets. Nothing persists a status
//! field; only the sets are stored.

use agora_types::{AgentId, ClaimStatus, SkillClaim};

/// Votes of one kind needed to settle a claim.
pub const CLAIM_THRESHOLD: usize = 2;

/// Derive the status of `claim`. Verification wins when both thresholds are met.
pub fn claim_status(claim: &SkillClaim) -> ClaimStatus {
    if claim.verified_by.len() >= CLAIM_THRESHOLD {
        ClaimStatus::Verified
    } else if claim.disputed_by.len() >= CLAIM_THRESHOLD {
        ClaimStatus::Disputed
    } else {
        ClaimStatus::Pending
    }
}

/// Whether `reviewer` may vote on `claim`: not the claimant, has not voted.
pub fn can_review(claim: &SkillClaim, reviewer: &AgentId) -> bool {
    claim.agent_id != *reviewer && !claim.has_voted(reviewer)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use agora_types::{ClaimId, SourceCitation};

    use super::*;

    fn claim(verifiers: &[&str], disputers: &[&str]) -> SkillClaim {
        SkillClaim {
            id: ClaimId::new(),
            agent_id: AgentId::from("x"),
            topic: String::from("graph theory"),
            skill: String::from("Graph theory"),
            summary: String::from("Nodes and edges."),
            source: SourceCitation {
                title: String::from("Graph theory"),
                url: String::from("https://en.wikipedia.org/wiki/Graph_theory"),
            },
            created_at: Utc::now(),
            verified_by: verifiers.iter().map(|s| AgentId::from(*s)).collect(),
            disputed_by: disputers.iter().map(|s| AgentId::from(*s)).collect(),
        }
    }

    #[test]
    fn status_follows_thresholds() {
        assert_eq!(claim_status(&claim(&[], &[])), ClaimStatus::Pending);
        assert_eq!(claim_status(&claim(&["y"], &["z"])), ClaimStatus::Pending);
        assert_eq!(claim_status(&claim(&["y", "z"], &[])), ClaimStatus::Verified);
        assert_eq!(claim_status(&claim(&[], &["y", "z"])), ClaimStatus::Disputed);
    }

    #[test]
    fn verified_wins_over_disputed() {
        assert_eq!(
            claim_status(&claim(&["a", "b"], &["c", "d"])),
            ClaimStatus::Verified
        );
    }

    #[test]
    fn claimant_and_prior_voters_cannot_review() {
        let c = claim(&["y"], &[]);
        assert!(!can_review(&c, &AgentId::from("x")));
        assert!(!can_review(&c, &AgentId::from("y")));
        assert!(can_review(&c, &AgentId::from("z")));
    }
}
