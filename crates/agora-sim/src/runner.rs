//! The autonomous run loop.
//!
//! One autonomous step per interval tick. Every `learning.every_steps`
//! steps the next topic is looked up on a background task on behalf of
//! the next enabled agent; the result comes back over a channel and is
//! applied through [`Session::finish_learning`], which drops it if the
//! roster changed in the meantime. Ctrl-C stops the loop and deactivates
//! the session.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use agora_lookup::{KnowledgeSource, LookupError, RosterClient};
use agora_social::StepReport;
use agora_store::StateStore;
use agora_types::{AgentId, KnowledgeSummary};

use crate::config::SimConfig;
use crate::session::{LearnOutcome, LearningTicket, Session};

/// Steps between stats log lines.
const STATS_EVERY_STEPS: u64 = 25;

/// A finished lookup on its way back to the loop.
type LookupResult = (LearningTicket, Result<KnowledgeSummary, LookupError>);

/// Why the loop stopped and what it did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Seed the stepper used.
    pub seed: u64,
    /// Autonomous steps taken.
    pub steps: u64,
    /// Steps that changed nothing.
    pub idle_steps: u64,
    /// Lookups applied.
    pub learned: u64,
    /// Lookups dropped as stale.
    pub discarded: u64,
    /// Lookups that failed.
    pub failed: u64,
    /// Whether the loop was interrupted before its step budget.
    pub interrupted: bool,
}

/// Whether `step` falls on a multiple of `every`. `every == 0` never does.
fn due(step: u64, every: u64) -> bool {
    step.checked_rem(every) == Some(0)
}

/// Pick the `cursor`-th enabled agent, wrapping around.
fn nth_learner<S: StateStore>(session: &Session<S>, cursor: usize) -> Option<AgentId> {
    let learners: Vec<&AgentId> = session
        .roster()
        .iter()
        .filter(|a| a.enabled && session.state().knows(&a.id))
        .map(|a| &a.id)
        .collect();
    let idx = cursor.checked_rem(learners.len())?;
    learners.get(idx).map(|id| (*id).clone())
}

/// Run the loop until the step budget is spent or Ctrl-C arrives.
pub async fn run<S, K>(
    session: &mut Session<S>,
    knowledge: Arc<K>,
    roster_client: Option<&RosterClient>,
    config: &SimConfig,
) -> RunSummary
where
    S: StateStore,
    K: KnowledgeSource + 'static,
{
    let seed = config.simulation.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut summary = RunSummary {
        seed,
        ..RunSummary::default()
    };
    info!(
        seed,
        steps = config.simulation.steps,
        step_interval_ms = config.simulation.step_interval_ms,
        topics = config.learning.topics.len(),
        "Entering run loop"
    );

    let mut interval = tokio::time::interval(Duration::from_millis(config.simulation.step_interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let (tx, mut rx) = mpsc::channel::<LookupResult>(8);
    let mut topic_cursor: usize = 0;
    let mut learner_cursor: usize = 0;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C, stopping");
                }
                info!("Interrupted, shutting down");
                summary.interrupted = true;
                break;
            }
            Some((ticket, result)) = rx.recv() => {
                match session.finish_learning(&ticket, result, Utc::now()).await {
                    LearnOutcome::Applied => summary.learned = summary.learned.saturating_add(1),
                    LearnOutcome::Discarded => summary.discarded = summary.discarded.saturating_add(1),
                    LearnOutcome::Failed(message) => {
                        info!(topic = %ticket.topic, message = %message, "Lookup did not succeed");
                        summary.failed = summary.failed.saturating_add(1);
                    }
                }
            }
            _ = interval.tick() => {
                if config.simulation.steps > 0 && summary.steps >= config.simulation.steps {
                    break;
                }

                let report = session.step(&mut rng, Utc::now()).await;
                summary.steps = summary.steps.saturating_add(1);
                log_report(summary.steps, &report);
                if matches!(report, StepReport::Idle { .. }) {
                    summary.idle_steps = summary.idle_steps.saturating_add(1);
                }

                if let Some(client) = roster_client
                    && due(summary.steps, config.roster.refresh_every_steps)
                {
                    let roster = client.fetch_or_default().await;
                    session.replace_roster(roster, Utc::now()).await;
                }

                if due(summary.steps, config.learning.every_steps)
                    && let Some(topic) = config
                        .learning
                        .topics
                        .get(topic_cursor.checked_rem(config.learning.topics.len()).unwrap_or(0))
                {
                    topic_cursor = topic_cursor.wrapping_add(1);
                    if let Some(learner) = nth_learner(session, learner_cursor) {
                        learner_cursor = learner_cursor.wrapping_add(1);
                        session.act_as(&learner).await;
                    }
                    spawn_lookup(session, topic, Arc::clone(&knowledge), tx.clone());
                }

                if due(summary.steps, STATS_EVERY_STEPS) {
                    let stats = session.stats();
                    info!(
                        step = summary.steps,
                        posts = stats.posts,
                        friendships = stats.friendships,
                        pending_requests = stats.pending_requests,
                        verified_claims = stats.verified_claims,
                        disputed_claims = stats.disputed_claims,
                        "Simulation stats"
                    );
                }
            }
        }
    }

    session.deactivate();
    summary
}

/// Start a lookup on a background task. No-op without an acting agent.
fn spawn_lookup<S, K>(
    session: &Session<S>,
    topic: &str,
    knowledge: Arc<K>,
    tx: mpsc::Sender<LookupResult>,
) where
    S: StateStore,
    K: KnowledgeSource + 'static,
{
    let Some(ticket) = session.begin_learning(topic) else {
        debug!(topic, "Skipping lookup: no acting agent");
        return;
    };
    info!(agent = %ticket.actor, topic = %ticket.topic, "Looking up topic");
    tokio::spawn(async move {
        let result = knowledge.lookup(&ticket.topic).await;
        if tx.send((ticket, result)).await.is_err() {
            debug!("Run loop gone, dropping lookup result");
        }
    });
}

fn log_report(step: u64, report: &StepReport) {
    match report {
        StepReport::Posted { author } => debug!(step, author = %author, "Status post"),
        StepReport::FriendAccepted { requester, addressee } => {
            info!(step, requester = %requester, addressee = %addressee, "Friend request accepted");
        }
        StepReport::FriendRequested { requester, addressee } => {
            debug!(step, requester = %requester, addressee = %addressee, "Friend request sent");
        }
        StepReport::ClaimReviewed { reviewer, claim, vote } => {
            info!(step, reviewer = %reviewer, claim = %claim, vote = vote.verb(), "Claim reviewed");
        }
        StepReport::GrowthUpdated { agent, appended } => {
            debug!(step, agent = %agent, appended, "Growth update");
        }
        StepReport::Idle { branch, reason } => debug!(step, ?branch, reason, "Idle step"),
    }
}

#[cfg(test)]
mod tests {
    use agora_lookup::default_roster;
    use agora_social::CompiledAutonomy;
    use agora_store::MemoryStore;

    use super::*;

    struct Echo;

    impl KnowledgeSource for Echo {
        async fn lookup(&self, topic: &str) -> Result<KnowledgeSummary, LookupError> {
            Ok(KnowledgeSummary {
                title: topic.to_uppercase(),
                summary: format!("About {topic}."),
                url: format!("https://example.org/{topic}"),
            })
        }
    }

    #[test]
    fn due_handles_zero_cadence() {
        assert!(!due(5, 0));
        assert!(due(6, 3));
        assert!(!due(7, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_run_stops_after_budget() {
        let mut session = Session::open(
            MemoryStore::new(),
            default_roster(),
            CompiledAutonomy::default(),
            Utc::now(),
        )
        .await;
        let mut config = SimConfig::default();
        config.simulation.steps = 30;
        config.simulation.step_interval_ms = 10;
        config.simulation.seed = Some(11);
        config.learning.topics = vec![String::from("graphs"), String::from("rust")];
        config.learning.every_steps = 4;

        let summary = run(&mut session, Arc::new(Echo), None, &config).await;
        assert_eq!(summary.steps, 30);
        assert_eq!(summary.seed, 11);
        assert!(!summary.interrupted);
        assert!(!session.is_active());
        assert_eq!(summary.learned, 7);
        assert_eq!(summary.discarded, 0);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn learners_rotate_through_enabled_agents() {
        let session = Session::open(
            MemoryStore::new(),
            default_roster(),
            CompiledAutonomy::default(),
            Utc::now(),
        )
        .await;
        let first = nth_learner(&session, 0);
        let fourth = nth_learner(&session, 3);
        assert!(first.is_some());
        assert_eq!(first, fourth);
        assert_ne!(nth_learner(&session, 1), first);
    }
}
