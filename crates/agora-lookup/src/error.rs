//! Error types for the HTTP collaborators.

/// Errors from roster, integration and knowledge lookups.
///
/// None of these are fatal. The roster and integration clients fall back
/// to defaults; a failed knowledge lookup is shown to the user through
/// [`LookupError::user_message`] and the state is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The topic was empty after trimming.
    #[error("empty topic")]
    EmptyTopic,

    /// The HTTP request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("{stage} returned HTTP {status}")]
    Status {
        /// Which call failed (`search`, `summary`, `roster`, `accounts`).
        stage: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// The search returned no pages for the topic.
    #[error("no results for topic '{0}'")]
    NoResults(String),

    /// The page exists but carries no summary text.
    #[error("no summary for page '{0}'")]
    MissingSummary(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl LookupError {
    /// A short message suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyTopic => String::from("Enter a topic to learn about."),
            Self::Request(_) => String::from("Could not reach the knowledge source. Try again later."),
            Self::Status { status, .. } => {
                format!("The knowledge source answered with an error (HTTP {status}).")
            }
            Self::NoResults(topic) => format!("Nothing found for \"{topic}\"."),
            Self::MissingSummary(title) => format!("\"{title}\" has no summary to learn from."),
            Self::Decode(_) => String::from("The knowledge source sent an unexpected response."),
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}
