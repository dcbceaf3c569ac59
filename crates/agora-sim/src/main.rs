//! Headless runner for the Agora social simulation.
//!
//! Loads the roster from the agent registry, restores the persisted social
//! state, and advances it with autonomous steps until the step budget is
//! spent or the process is interrupted.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `agora-config.yaml`
//! 3. Compile the stepper weights
//! 4. Fetch the roster (built-in default on failure)
//! 5. Open the session against the file store
//! 6. Render missing avatars and announce connected integrations
//! 7. Run the loop
//! 8. Log the result

mod config;
mod error;
mod runner;
mod session;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agora_lookup::{IntegrationClient, KnowledgeClient, RosterClient};
use agora_store::FileStore;

use crate::config::SimConfig;
use crate::error::SimError;
use crate::session::Session;

/// Config file looked up in the working directory.
const CONFIG_FILE: &str = "agora-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or a client cannot be built.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("agora-sim starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        roster_url = %config.roster.url,
        store_dir = %config.store.dir,
        steps = config.simulation.steps,
        "Configuration loaded"
    );

    // 3. Compile stepper weights.
    let autonomy = config.simulation.autonomy.compile().map_err(SimError::from)?;

    // 4. Fetch the roster.
    let roster_client = RosterClient::new(&config.roster.url, config.roster.timeout())
        .map_err(SimError::from)?;
    let roster = roster_client.fetch_or_default().await;

    // 5. Open the session.
    let store = FileStore::new(&config.store.dir);
    info!(path = %store.path().display(), "Using file store");
    let mut session = Session::open(store, roster, autonomy, Utc::now()).await;

    // 6. Avatars and integrations.
    if config.simulation.generate_avatars {
        let rendered = session.fill_missing_avatars(Utc::now()).await;
        info!(rendered, "Avatars checked");
    }
    let accounts = IntegrationClient::new(&config.roster.accounts_url, config.roster.timeout())
        .map_err(SimError::from)?
        .fetch_or_empty()
        .await;
    session.announce(&accounts, Utc::now()).await;

    // 7. Run.
    let knowledge = Arc::new(KnowledgeClient::new(config.knowledge.settings()).map_err(SimError::from)?);
    let summary = runner::run(&mut session, knowledge, Some(&roster_client), &config).await;

    // 8. Log results.
    let stats = session.stats();
    info!(
        seed = summary.seed,
        steps = summary.steps,
        idle_steps = summary.idle_steps,
        learned = summary.learned,
        discarded = summary.discarded,
        failed = summary.failed,
        interrupted = summary.interrupted,
        posts = stats.posts,
        friendships = stats.friendships,
        verified_claims = stats.verified_claims,
        "agora-sim shutdown complete"
    );

    Ok(())
}

/// Load configuration from `agora-config.yaml`, or defaults if it is absent.
fn load_config() -> Result<SimConfig, SimError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok(SimConfig::from_file(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimConfig::parse("")?)
    }
}
