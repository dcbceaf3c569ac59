//! Error types for the persistence layer.

/// Errors that can occur while loading or saving the social state.
///
/// Malformed content is not an error: the decoder defaults whatever it
/// cannot read. Only I/O failures and a top-level value that cannot be
/// serialized at all are reported.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading, writing or renaming the backing file failed.
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        /// File the operation touched.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
