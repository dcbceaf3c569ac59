//! Configuration for the simulation runner.
//!
//! The configuration lives in `agora-config.yaml` in the working
//! directory. Every section and field has a default, so an empty or
//! missing file gives a runnable setup against local services.
//!
//! Environment variables override the service locations:
//! - `AGORA_ROSTER_URL` overrides `roster.url`
//! - `AGORA_ACCOUNTS_URL` overrides `roster.accounts_url`
//! - `AGORA_STORE_DIR` overrides `store.dir`

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use agora_lookup::KnowledgeSettings;
use agora_social::AutonomyConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level runner configuration, mirroring `agora-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimConfig {
    /// Agent registry and integration endpoints.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Encyclopedia endpoints for knowledge lookups.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Where the social state is persisted.
    #[serde(default)]
    pub store: StoreConfig,

    /// Autonomous loop pacing and stepper tuning.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Periodic knowledge lookups.
    #[serde(default)]
    pub learning: LearningConfig,
}

impl SimConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document parses as YAML null, not as an empty mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override service locations with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AGORA_ROSTER_URL") {
            self.roster.url = val;
        }
        if let Ok(val) = std::env::var("AGORA_ACCOUNTS_URL") {
            self.roster.accounts_url = val;
        }
        if let Ok(val) = std::env::var("AGORA_STORE_DIR") {
            self.store.dir = val;
        }
    }

    /// Reject values the runner cannot work with.
    ///
    /// Stepper weights are checked separately when they are compiled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: String::from(reason),
            })
        };
        if self.simulation.step_interval_ms == 0 {
            return invalid("simulation.step_interval_ms must be positive");
        }
        if !self.learning.topics.is_empty() && self.learning.every_steps == 0 {
            return invalid("learning.every_steps must be positive when topics are set");
        }
        if self.knowledge.summary_max_chars < 2 {
            return invalid("knowledge.summary_max_chars must be at least 2");
        }
        if self.store.dir.trim().is_empty() {
            return invalid("store.dir must not be empty");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Agent registry and integration account endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// Roster endpoint returning the agent list.
    #[serde(default = "default_roster_url")]
    pub url: String,

    /// Integration accounts endpoint.
    #[serde(default = "default_accounts_url")]
    pub accounts_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_roster_timeout_ms")]
    pub timeout_ms: u64,

    /// Refetch the roster every this many steps. `0` fetches only at startup.
    #[serde(default)]
    pub refresh_every_steps: u64,
}

impl RosterConfig {
    /// Request timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            url: default_roster_url(),
            accounts_url: default_accounts_url(),
            timeout_ms: default_roster_timeout_ms(),
            refresh_every_steps: 0,
        }
    }
}

/// Encyclopedia endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnowledgeConfig {
    /// `MediaWiki` action API endpoint.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// REST page-summary base URL.
    #[serde(default = "default_summary_url")]
    pub summary_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_knowledge_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum summary length in characters.
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,
}

impl KnowledgeConfig {
    /// Client settings for [`agora_lookup::KnowledgeClient`].
    pub fn settings(&self) -> KnowledgeSettings {
        KnowledgeSettings {
            search_url: self.search_url.clone(),
            summary_url: self.summary_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            summary_max_chars: self.summary_max_chars,
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            summary_url: default_summary_url(),
            timeout_ms: default_knowledge_timeout_ms(),
            summary_max_chars: default_summary_max_chars(),
        }
    }
}

/// Persistence location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the state document.
    #[serde(default = "default_store_dir")]
    pub dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

/// Autonomous loop pacing and stepper tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Steps to run before exiting. `0` runs until interrupted.
    #[serde(default = "default_steps")]
    pub steps: u64,

    /// Real-time milliseconds between steps.
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,

    /// Seed for the stepper. Unset draws a fresh seed and logs it.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Render an avatar at startup for agents that have none.
    #[serde(default = "default_true")]
    pub generate_avatars: bool,

    /// Branch weights and in-branch chances.
    #[serde(flatten)]
    pub autonomy: AutonomyConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            step_interval_ms: default_step_interval_ms(),
            seed: None,
            generate_avatars: true,
            autonomy: AutonomyConfig::default(),
        }
    }
}

/// Periodic knowledge lookups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LearningConfig {
    /// Topics to study, cycled in order. Empty disables learning.
    #[serde(default)]
    pub topics: Vec<String>,

    /// Start a lookup every this many steps.
    #[serde(default = "default_learning_every_steps")]
    pub every_steps: u64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            topics: Vec::new(),
            every_steps: default_learning_every_steps(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_roster_url() -> String {
    "http://127.0.0.1:8787/api/agents".to_owned()
}

fn default_accounts_url() -> String {
    "http://127.0.0.1:8787/api/integrations/accounts".to_owned()
}

const fn default_roster_timeout_ms() -> u64 {
    5000
}

fn default_search_url() -> String {
    agora_lookup::knowledge::DEFAULT_SEARCH_URL.to_owned()
}

fn default_summary_url() -> String {
    agora_lookup::knowledge::DEFAULT_SUMMARY_URL.to_owned()
}

const fn default_knowledge_timeout_ms() -> u64 {
    8000
}

const fn default_summary_max_chars() -> usize {
    agora_lookup::knowledge::DEFAULT_SUMMARY_MAX_CHARS
}

fn default_store_dir() -> String {
    ".agora".to_owned()
}

const fn default_steps() -> u64 {
    200
}

const fn default_step_interval_ms() -> u64 {
    1500
}

const fn default_true() -> bool {
    true
}

const fn default_learning_every_steps() -> u64 {
    20
}
