//! A running social simulation: state, roster and persistence together.
//!
//! The session owns the only mutable copy of the [`SocialState`]. Every
//! change goes through [`Session::apply`], which swaps in the reducer's
//! output and saves it. A failed save is logged and the in-memory state is
//! kept, so the simulation never stalls on storage.
//!
//! Knowledge lookups run outside the session. [`Session::begin_learning`]
//! hands out a [`LearningTicket`] stamped with the roster epoch and the
//! acting agent; [`Session::finish_learning`] applies the result only if
//! the session is still active and neither has changed since.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use agora_lookup::LookupError;
use agora_social::{
    CompiledAutonomy, SocialStats, StepReport, announce_integrations, apply_generated_avatar,
    apply_learning, autonomous_step, change_actor, hydrate, set_lab_target, social_stats,
};
use agora_store::StateStore;
use agora_types::{AgentId, IntegrationAccount, KnowledgeSummary, RosterAgent, SocialState};

/// What became of a knowledge lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnOutcome {
    /// The summary was turned into a claim, a log entry and a post.
    Applied,
    /// The result arrived after the session moved on and was dropped.
    Discarded,
    /// The lookup failed; carries a message fit for a user.
    Failed(String),
}

/// A lookup in flight, stamped with the session context it started in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningTicket {
    /// Topic being looked up.
    pub topic: String,
    /// Agent that will own the resulting claim.
    pub actor: AgentId,
    /// Roster epoch when the lookup started.
    pub epoch: u64,
}

/// A social simulation bound to a store.
pub struct Session<S: StateStore> {
    state: SocialState,
    roster: Vec<RosterAgent>,
    epoch: u64,
    active: AtomicBool,
    store: S,
    autonomy: CompiledAutonomy,
}

impl<S: StateStore> Session<S> {
    /// Load the stored state, hydrate it against `roster`, and save the result.
    ///
    /// A store that cannot be read is treated as empty.
    pub async fn open(
        store: S,
        roster: Vec<RosterAgent>,
        autonomy: CompiledAutonomy,
        now: DateTime<Utc>,
    ) -> Self {
        let stored = match store.load().await {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Could not read stored state, starting empty");
                SocialState::default()
            }
        };
        let state = hydrate(&stored, &roster, now);
        info!(
            agents = roster.len(),
            posts = state.posts.len(),
            claims = state.claims.len(),
            "Session opened"
        );
        let session = Self {
            state,
            roster,
            epoch: 0,
            active: AtomicBool::new(true),
            store,
            autonomy,
        };
        session.persist().await;
        session
    }

    /// Current state.
    pub const fn state(&self) -> &SocialState {
        &self.state
    }

    /// Current roster.
    pub fn roster(&self) -> &[RosterAgent] {
        &self.roster
    }

    /// Whether the session still accepts results.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop accepting late results.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Entity counts for logging.
    pub fn stats(&self) -> SocialStats {
        social_stats(&self.state)
    }

    /// Run a reducer and keep its output. Saves only when something changed.
    ///
    /// Returns whether the state changed.
    pub async fn apply(&mut self, reducer: impl FnOnce(&SocialState) -> SocialState) -> bool {
        let next = reducer(&self.state);
        if next == self.state {
            return false;
        }
        self.state = next;
        self.persist().await;
        true
    }

    /// Save the current state; failures are logged, never returned.
    async fn persist(&self) {
        if let Err(e) = self.store.save(&self.state).await {
            warn!(error = %e, "Failed to persist social state");
        }
    }

    /// Swap in a new roster and re-hydrate.
    ///
    /// Bumps the epoch so lookups started against the old roster are dropped.
    pub async fn replace_roster(&mut self, roster: Vec<RosterAgent>, now: DateTime<Utc>) {
        self.epoch = self.epoch.saturating_add(1);
        self.roster = roster;
        let roster = &self.roster;
        self.state = hydrate(&self.state, roster, now);
        info!(epoch = self.epoch, agents = self.roster.len(), "Roster replaced");
        self.persist().await;
    }

    /// Run one autonomous step.
    pub async fn step(&mut self, rng: &mut impl Rng, now: DateTime<Utc>) -> StepReport {
        let outcome = autonomous_step(&self.state, &self.roster, &self.autonomy, rng, now);
        if !outcome.is_idle() {
            self.state = outcome.state;
            self.persist().await;
        }
        outcome.report
    }

    /// Make `agent` the acting identity.
    pub async fn act_as(&mut self, agent: &AgentId) -> bool {
        self.apply(|s| change_actor(s, agent)).await
    }

    /// Render avatars for every agent that has none yet.
    pub async fn fill_missing_avatars(&mut self, now: DateTime<Utc>) -> usize {
        let missing: Vec<AgentId> = self
            .state
            .profiles
            .iter()
            .filter(|(_, p)| p.avatar_image.is_none())
            .map(|(id, _)| id.clone())
            .collect();
        let previous_target = self.state.lab.target_agent_id.clone();

        let mut next = self.state.clone();
        for agent in &missing {
            next = apply_generated_avatar(&set_lab_target(&next, agent), now);
        }
        if let Some(target) = previous_target {
            next = set_lab_target(&next, &target);
        }
        if !missing.is_empty() {
            debug!(count = missing.len(), "Generated avatars");
            self.state = next;
            self.persist().await;
        }
        missing.len()
    }

    /// Post about connected integration accounts as the current actor.
    pub async fn announce(&mut self, accounts: &[IntegrationAccount], now: DateTime<Utc>) -> bool {
        self.apply(|s| announce_integrations(s, accounts, now)).await
    }

    /// Stamp a lookup for `topic` with the current context.
    ///
    /// `None` when there is no acting agent or the session is shut down.
    pub fn begin_learning(&self, topic: &str) -> Option<LearningTicket> {
        if !self.is_active() {
            return None;
        }
        let actor = self.state.current_actor_id.clone()?;
        Some(LearningTicket {
            topic: topic.trim().to_owned(),
            actor,
            epoch: self.epoch,
        })
    }

    /// Apply the result of a lookup started with [`Self::begin_learning`].
    pub async fn finish_learning(
        &mut self,
        ticket: &LearningTicket,
        result: Result<KnowledgeSummary, LookupError>,
        now: DateTime<Utc>,
    ) -> LearnOutcome {
        let stale = !self.is_active()
            || ticket.epoch != self.epoch
            || self.state.current_actor_id.as_ref() != Some(&ticket.actor);
        if stale {
            debug!(topic = %ticket.topic, epoch = ticket.epoch, "Dropping stale lookup result");
            return LearnOutcome::Discarded;
        }

        match result {
            Ok(knowledge) => {
                self.apply(|s| apply_learning(s, &ticket.topic, &knowledge, now)).await;
                info!(
                    agent = %ticket.actor,
                    topic = %ticket.topic,
                    skill = %knowledge.title,
                    "Learned from lookup"
                );
                LearnOutcome::Applied
            }
            Err(e) => {
                warn!(topic = %ticket.topic, error = %e, "Knowledge lookup failed");
                LearnOutcome::Failed(e.user_message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use agora_lookup::default_roster;
    use agora_store::{MemoryStore, StoreError};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use agora_lookup::KnowledgeSource;

    use super::*;

    /// Answers every lookup with a fixed summary, or "no results" when empty.
    struct Canned(Option<KnowledgeSummary>);

    impl KnowledgeSource for Canned {
        async fn lookup(&self, topic: &str) -> Result<KnowledgeSummary, LookupError> {
            self.0
                .clone()
                .ok_or_else(|| LookupError::NoResults(String::from(topic)))
        }
    }

    struct BrokenStore;

    impl StateStore for BrokenStore {
        async fn load(&self) -> Result<Option<SocialState>, StoreError> {
            Err(StoreError::Io {
                path: String::from("/nowhere"),
                source: std::io::Error::other("disk gone"),
            })
        }

        async fn save(&self, _state: &SocialState) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: String::from("/nowhere"),
                source: std::io::Error::other("disk gone"),
            })
        }
    }

    /// Look up `topic` and apply the result in one go.
    async fn learn<S: StateStore>(
        session: &mut Session<S>,
        topic: &str,
        source: &impl KnowledgeSource,
        now: DateTime<Utc>,
    ) -> LearnOutcome {
        let Some(ticket) = session.begin_learning(topic) else {
            return LearnOutcome::Discarded;
        };
        let result = source.lookup(&ticket.topic).await;
        session.finish_learning(&ticket, result, now).await
    }

    fn summary() -> KnowledgeSummary {
        KnowledgeSummary {
            title: String::from("Graph theory"),
            summary: String::from("The study of graphs."),
            url: String::from("https://en.wikipedia.org/wiki/Graph_theory"),
        }
    }

    async fn open_default() -> Session<MemoryStore> {
        let mut session = Session::open(
            MemoryStore::new(),
            default_roster(),
            CompiledAutonomy::default(),
            Utc::now(),
        )
        .await;
        let first = session.roster().first().map(|a| a.id.clone());
        if let Some(first) = first {
            session.act_as(&first).await;
        }
        session
    }

    #[tokio::test]
    async fn open_seeds_and_persists() {
        let session = open_default().await;
        assert_eq!(session.state().posts.len(), 3);
        assert!(session.store.document().await.is_some());
    }

    #[tokio::test]
    async fn reopen_restores_saved_state() {
        let session = open_default().await;
        let saved = session.state().clone();
        let store = MemoryStore::with_document(&session.store.document().await.unwrap_or_default());

        let reopened =
            Session::open(store, default_roster(), CompiledAutonomy::default(), Utc::now()).await;
        assert_eq!(reopened.state(), &saved);
    }

    #[tokio::test]
    async fn learning_applies_for_current_actor() {
        let mut session = open_default().await;
        let outcome = learn(&mut session, "graphs", &Canned(Some(summary())), Utc::now()).await;
        assert_eq!(outcome, LearnOutcome::Applied);
        assert_eq!(session.state().claims.len(), 1);
        assert_eq!(session.state().learning_logs.len(), 1);
    }

    #[tokio::test]
    async fn failed_lookup_leaves_state_untouched() {
        let mut session = open_default().await;
        let before = session.state().clone();
        let outcome = learn(&mut session, "zzqx", &Canned(None), Utc::now()).await;
        assert!(matches!(outcome, LearnOutcome::Failed(msg) if msg.contains("zzqx")));
        assert_eq!(session.state(), &before);
    }

    #[tokio::test]
    async fn result_after_roster_refresh_is_discarded() {
        let mut session = open_default().await;
        let ticket = session.begin_learning("graphs");
        assert!(ticket.is_some());
        let Some(ticket) = ticket else { return };

        session.replace_roster(default_roster(), Utc::now()).await;
        let outcome = session.finish_learning(&ticket, Ok(summary()), Utc::now()).await;
        assert_eq!(outcome, LearnOutcome::Discarded);
        assert!(session.state().claims.is_empty());
    }

    #[tokio::test]
    async fn result_after_shutdown_is_discarded() {
        let mut session = open_default().await;
        let ticket = session.begin_learning("graphs");
        session.deactivate();
        assert!(session.begin_learning("more").is_none());
        if let Some(ticket) = ticket {
            let outcome = session.finish_learning(&ticket, Ok(summary()), Utc::now()).await;
            assert_eq!(outcome, LearnOutcome::Discarded);
        }
    }

    #[tokio::test]
    async fn broken_store_does_not_stop_the_session() {
        let mut session =
            Session::open(BrokenStore, default_roster(), CompiledAutonomy::default(), Utc::now())
                .await;
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..20 {
            session.step(&mut rng, Utc::now()).await;
        }
        assert!(session.state().posts.len() >= 3);
    }

    #[tokio::test]
    async fn avatars_fill_once_and_keep_target() {
        let mut session = open_default().await;
        let target = session.state().lab.target_agent_id.clone();
        assert_eq!(session.fill_missing_avatars(Utc::now()).await, 3);
        assert_eq!(session.fill_missing_avatars(Utc::now()).await, 0);
        assert_eq!(session.state().lab.target_agent_id, target);
        assert!(session.state().profiles.values().all(|p| p.avatar_image.is_some()));
    }
}
