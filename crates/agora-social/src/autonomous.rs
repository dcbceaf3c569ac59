//! The autonomous stepper.
//!
//! Each call advances the simulation by exactly one randomized action. The
//! branch is chosen from a [`WeightedTable`] built from
//! [`CompiledAutonomy`]; branches that need to search (finding two
//! unrelated agents) use [`retry_bounded`]. If the chosen branch has no
//! valid participants the state is returned unchanged and the report says
//! why. The stepper never fails and never carries retries across calls.
//!
//! All randomness, including the identifiers of created entities, comes
//! from the injected [`Rng`], so a seeded generator gives a reproducible
//! run.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use agora_types::{
    AgentId, ClaimId, ClaimStatus, FriendshipId, FriendshipStatus, PostId, RosterAgent,
    SocialState, VoteKind,
};

use crate::actions::{cast_vote, pending_request};
use crate::claims::{can_review, claim_status};
use crate::config::{BASIS_POINTS, CompiledAutonomy};
use crate::feed::{display_handle, new_post, publish};
use crate::relationship::find_friendship;

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

/// A discrete distribution over `T` with integer weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedTable<T> {
    entries: Vec<(u32, T)>,
    total: u32,
}

impl<T: Copy> WeightedTable<T> {
    /// Build a table. Zero weights are dropped; the total saturates.
    pub fn new(entries: impl IntoIterator<Item = (u32, T)>) -> Self {
        let entries: Vec<(u32, T)> = entries.into_iter().filter(|(w, _)| *w > 0).collect();
        let total = entries.iter().fold(0_u32, |acc, (w, _)| acc.saturating_add(*w));
        Self { entries, total }
    }

    /// Sum of all weights.
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Map a roll in `0..total` to an entry. Rolls at or past the total
    /// return `None`.
    pub fn pick(&self, roll: u32) -> Option<T> {
        let mut upper = 0_u32;
        for (weight, item) in &self.entries {
            upper = upper.saturating_add(*weight);
            if roll < upper {
                return Some(*item);
            }
        }
        None
    }

    /// Draw an entry using `rng`. Returns `None` for an empty table.
    pub fn sample(&self, rng: &mut impl Rng) -> Option<T> {
        if self.total == 0 {
            return None;
        }
        self.pick(rng.random_range(0..self.total))
    }
}

/// Call `attempt` up to `attempts` times, returning the first `Some`.
pub fn retry_bounded<T>(attempts: u32, mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
    (0..attempts).find_map(|_| attempt())
}

/// Uniformly pick one element of `items`.
fn pick_one<'a, T>(items: &'a [T], rng: &mut impl Rng) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len()))
}

/// Whether a roll succeeds with `chance` basis points.
fn chance(rng: &mut impl Rng, chance: u32) -> bool {
    rng.random_range(0..BASIS_POINTS) < chance
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// The four autonomous behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepBranch {
    /// A status post.
    StatusPost,
    /// Accept or send a friend request.
    Friendship,
    /// Review a pending claim.
    ClaimReview,
    /// Refine a soul document.
    GrowthUpdate,
}

/// What a single autonomous step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepReport {
    /// An agent published a status post.
    Posted {
        /// The author.
        author: AgentId,
    },
    /// A pending request was accepted.
    FriendAccepted {
        /// Who sent the request.
        requester: AgentId,
        /// Who accepted it.
        addressee: AgentId,
    },
    /// A new request was sent.
    FriendRequested {
        /// Who sent the request.
        requester: AgentId,
        /// Who received it.
        addressee: AgentId,
    },
    /// A peer voted on a claim.
    ClaimReviewed {
        /// The reviewer.
        reviewer: AgentId,
        /// The claim.
        claim: ClaimId,
        /// The vote cast.
        vote: VoteKind,
    },
    /// An agent refined its soul document.
    GrowthUpdated {
        /// The agent.
        agent: AgentId,
        /// Whether the clue was new (and therefore appended).
        appended: bool,
    },
    /// Nothing happened.
    Idle {
        /// The branch that was chosen, if any.
        branch: Option<StepBranch>,
        /// Why nothing happened.
        reason: &'static str,
    },
}

/// Result of one autonomous step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// The next state (equal to the input when idle).
    pub state: SocialState,
    /// What happened.
    pub report: StepReport,
}

impl StepOutcome {
    fn idle(state: &SocialState, branch: Option<StepBranch>, reason: &'static str) -> Self {
        debug!(?branch, reason, "Autonomous step idle");
        Self {
            state: state.clone(),
            report: StepReport::Idle { branch, reason },
        }
    }

    /// Whether the step changed anything.
    pub const fn is_idle(&self) -> bool {
        matches!(self.report, StepReport::Idle { .. })
    }
}

// ---------------------------------------------------------------------------
// Content pools
// ---------------------------------------------------------------------------

/// Status post templates. `{goal}` is replaced by the growth goal.
const STATUS_TEMPLATES: &[&str] = &[
    "Quiet hour. Spent it on {goal}.",
    "Small win today toward {goal}.",
    "Still chipping away at {goal}. Tips welcome.",
    "Reminder to self: {goal}, one task at a time.",
    "Wrote down what I learned about {goal} so the team can reuse it.",
];

/// Concrete practices appended to soul documents.
const GROWTH_CLUES: &[&str] = &[
    "ask one clarifying question before acting",
    "summarize decisions in one sentence",
    "share sources with every claim",
    "review a peer's work every day",
    "write down what went wrong, without blame",
];

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// Build the branch table for `config`.
pub fn step_table(config: &CompiledAutonomy) -> WeightedTable<StepBranch> {
    WeightedTable::new([
        (config.status_post, StepBranch::StatusPost),
        (config.friendship, StepBranch::Friendship),
        (config.claim_review, StepBranch::ClaimReview),
        (config.growth_update, StepBranch::GrowthUpdate),
    ])
}

/// Advance the simulation by one randomized action.
///
/// Only enabled roster agents that have a profile in `state` take part.
pub fn autonomous_step(
    state: &SocialState,
    roster: &[RosterAgent],
    config: &CompiledAutonomy,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> StepOutcome {
    let Some(branch) = step_table(config).sample(rng) else {
        return StepOutcome::idle(state, None, "no branch has a positive weight");
    };

    let active: Vec<AgentId> = roster
        .iter()
        .filter(|a| a.enabled && state.knows(&a.id))
        .map(|a| a.id.clone())
        .collect();

    match branch {
        StepBranch::StatusPost => status_post(state, &active, rng, now),
        StepBranch::Friendship => friendship(state, &active, config, rng, now),
        StepBranch::ClaimReview => claim_review(state, &active, config, rng, now),
        StepBranch::GrowthUpdate => growth_update(state, &active, rng, now),
    }
}

fn random_post_id(rng: &mut impl Rng) -> PostId {
    PostId::from_random_bytes(rng.random())
}

fn growth_goal(state: &SocialState, agent: &AgentId) -> String {
    state
        .profiles
        .get(agent)
        .map(|p| p.growth_goal.trim().to_owned())
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| String::from("getting a little better every day"))
}

fn status_post(
    state: &SocialState,
    active: &[AgentId],
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> StepOutcome {
    let branch = Some(StepBranch::StatusPost);
    let Some(author) = pick_one(active, rng).cloned() else {
        return StepOutcome::idle(state, branch, "no enabled agents");
    };
    let template = pick_one(STATUS_TEMPLATES, rng).copied().unwrap_or("Working on {goal}.");
    let content = template.replace("{goal}", &growth_goal(state, &author));

    let mut next = state.clone();
    publish(&mut next, new_post(random_post_id(rng), author.clone(), content, now, None));
    StepOutcome {
        state: next,
        report: StepReport::Posted { author },
    }
}

fn friendship(
    state: &SocialState,
    active: &[AgentId],
    config: &CompiledAutonomy,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> StepOutcome {
    let branch = Some(StepBranch::Friendship);
    let pending: Vec<usize> = state
        .friendships
        .iter()
        .enumerate()
        .filter(|(_, f)| f.status == FriendshipStatus::Pending && active.contains(&f.addressee_id))
        .map(|(i, _)| i)
        .collect();

    if !pending.is_empty() && chance(rng, config.accept_pending_chance) {
        let Some(&idx) = pick_one(&pending, rng) else {
            return StepOutcome::idle(state, branch, "no pending requests");
        };
        let mut next = state.clone();
        let Some(record) = next.friendships.get_mut(idx) else {
            return StepOutcome::idle(state, branch, "no pending requests");
        };
        record.status = FriendshipStatus::Friends;
        record.updated_at = now;
        let requester = record.requester_id.clone();
        let addressee = record.addressee_id.clone();

        let content = format!(
            "{} and {} are now friends.",
            display_handle(state, &addressee),
            display_handle(state, &requester)
        );
        publish(&mut next, new_post(random_post_id(rng), addressee.clone(), content, now, None));
        return StepOutcome {
            state: next,
            report: StepReport::FriendAccepted { requester, addressee },
        };
    }

    let pair = retry_bounded(config.friend_attempts, || {
        let a = pick_one(active, rng)?;
        let b = pick_one(active, rng)?;
        if a == b || find_friendship(&state.friendships, a, b).is_some() {
            return None;
        }
        Some((a.clone(), b.clone()))
    });
    let Some((requester, addressee)) = pair else {
        return StepOutcome::idle(state, branch, "no unrelated pair found");
    };

    let mut next = state.clone();
    let id = FriendshipId::from_random_bytes(rng.random());
    next.friendships
        .push(pending_request(id, requester.clone(), addressee.clone(), now));
    let content = format!(
        "Sent a friend request to {}.",
        display_handle(state, &addressee)
    );
    publish(&mut next, new_post(random_post_id(rng), requester.clone(), content, now, None));
    StepOutcome {
        state: next,
        report: StepReport::FriendRequested { requester, addressee },
    }
}

fn claim_review(
    state: &SocialState,
    active: &[AgentId],
    config: &CompiledAutonomy,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> StepOutcome {
    let branch = Some(StepBranch::ClaimReview);
    let pending: Vec<ClaimId> = state
        .claims
        .iter()
        .filter(|c| claim_status(c) == ClaimStatus::Pending)
        .map(|c| c.id)
        .collect();
    let Some(&claim_id) = pick_one(&pending, rng) else {
        return StepOutcome::idle(state, branch, "no pending claims");
    };
    let Some(claim) = state.claim(claim_id) else {
        return StepOutcome::idle(state, branch, "no pending claims");
    };
    let eligible: Vec<AgentId> = active
        .iter()
        .filter(|id| can_review(claim, id))
        .cloned()
        .collect();
    let Some(reviewer) = pick_one(&eligible, rng).cloned() else {
        return StepOutcome::idle(state, branch, "no eligible reviewer");
    };
    let vote = if chance(rng, config.verify_chance) {
        VoteKind::Verify
    } else {
        VoteKind::Dispute
    };

    match cast_vote(state, claim_id, &reviewer, vote, random_post_id(rng), now) {
        Some(next) => StepOutcome {
            state: next,
            report: StepReport::ClaimReviewed {
                reviewer,
                claim: claim_id,
                vote,
            },
        },
        None => StepOutcome::idle(state, branch, "no eligible reviewer"),
    }
}

fn growth_update(
    state: &SocialState,
    active: &[AgentId],
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> StepOutcome {
    let branch = Some(StepBranch::GrowthUpdate);
    let Some(agent) = pick_one(active, rng).cloned() else {
        return StepOutcome::idle(state, branch, "no enabled agents");
    };
    let practice = pick_one(GROWTH_CLUES, rng).copied().unwrap_or("keep learning");
    let goal = growth_goal(state, &agent);
    let clue = format!("Growth clue ({goal}): {practice}.");

    let mut next = state.clone();
    let Some(profile) = next.profiles.get_mut(&agent) else {
        return StepOutcome::idle(state, branch, "agent has no profile");
    };
    let appended = !profile.soul.contains(&clue);
    if appended {
        if !profile.soul.is_empty() {
            profile.soul.push('\n');
        }
        profile.soul.push_str(&clue);
    }

    let content = format!("Updated my soul document: {practice}, in service of {goal}.");
    publish(&mut next, new_post(random_post_id(rng), agent.clone(), content, now, None));
    StepOutcome {
        state: next,
        report: StepReport::GrowthUpdated { agent, appended },
    }
}
