//! Error types for the simulation runner binary.
//!
//! [`SimError`] is the top-level error that `main` propagates. Only
//! startup problems reach it: once the loop runs, lookup and persistence
//! failures are logged and the session carries on.

/// Top-level error for the runner binary.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Stepper weights could not be compiled.
    #[error("stepper config error: {source}")]
    Social {
        /// The underlying social error.
        #[from]
        source: agora_social::SocialError,
    },

    /// An HTTP client could not be constructed.
    #[error("lookup client error: {source}")]
    Lookup {
        /// The underlying lookup error.
        #[from]
        source: agora_lookup::LookupError,
    },
}
