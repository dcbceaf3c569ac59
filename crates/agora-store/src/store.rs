//! State store implementations.
//!
//! The whole [`SocialState`] is persisted as one JSON document under a
//! fixed storage key. [`FileStore`] keeps it at `<dir>/<key>.json` and
//! replaces the file atomically; [`MemoryStore`] keeps the serialized text
//! in memory and is used by tests and dry runs.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use uuid::Uuid;

use agora_types::SocialState;

use crate::decode::decode_state;
use crate::error::StoreError;

/// Storage key of the social state document.
pub const STORAGE_KEY: &str = "agora.social.v1";

/// Load/save boundary for the social state.
///
/// `load` returns `Ok(None)` when nothing has been stored yet. A stored
/// document that is partly malformed still loads; see [`crate::decode`].
pub trait StateStore: Send + Sync {
    /// Read the stored state, if any.
    fn load(&self) -> impl Future<Output = Result<Option<SocialState>, StoreError>> + Send;

    /// Replace the stored state.
    fn save(&self, state: &SocialState) -> impl Future<Output = Result<(), StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// JSON file store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    key: String,
}

impl FileStore {
    /// Create a store under `dir` using [`STORAGE_KEY`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_key(dir, STORAGE_KEY)
    }

    /// Create a store under `dir` with a custom key.
    pub fn with_key(dir: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            dir: dir.into(),
            key: String::from(key),
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl StateStore for FileStore {
    async fn load(&self) -> Result<Option<SocialState>, StoreError> {
        let path = self.path();
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No stored state yet");
                return Ok(None);
            }
            Err(e) => return Err(Self::io_error(&path, e)),
        };
        let state = decode_state(&raw);
        tracing::debug!(
            path = %path.display(),
            posts = state.posts.len(),
            profiles = state.profiles.len(),
            "Loaded stored state"
        );
        Ok(Some(state))
    }

    async fn save(&self, state: &SocialState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?;

        // Write next to the target, then rename over it.
        let path = self.path();
        let tmp = self.dir.join(format!("{}.{}.tmp", self.key, Uuid::new_v4()));
        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| Self::io_error(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Self::io_error(&path, e));
        }

        tracing::debug!(path = %path.display(), bytes = json.len(), "Saved state");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Memory store
// ---------------------------------------------------------------------------

/// In-memory store holding the serialized document.
///
/// Goes through the same JSON encoding and lenient decoding as
/// [`FileStore`], so a round trip behaves identically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with a raw document.
    pub fn with_document(raw: &str) -> Self {
        Self {
            document: Mutex::new(Some(String::from(raw))),
        }
    }

    /// The raw stored document, if any.
    pub async fn document(&self) -> Option<String> {
        self.document.lock().await.clone()
    }
}

impl StateStore for MemoryStore {
    async fn load(&self) -> Result<Option<SocialState>, StoreError> {
        Ok(self.document.lock().await.as_deref().map(decode_state))
    }

    async fn save(&self, state: &SocialState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        *self.document.lock().await = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_uses_storage_key() {
        let store = FileStore::new("/tmp/agora");
        assert_eq!(store.path(), PathBuf::from("/tmp/agora/agora.social.v1.json"));
    }

    #[tokio::test]
    async fn memory_store_starts_empty() {
        let store = MemoryStore::new();
        assert!(matches!(store.load().await, Ok(None)));
    }

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        let mut state = SocialState::new();
        state.lab.project_id = String::from("proj-7");
        assert!(store.save(&state).await.is_ok());
        let loaded = store.load().await.ok().flatten().unwrap_or_default();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn memory_store_tolerates_bad_document() {
        let store = MemoryStore::with_document("{\"posts\": 5}");
        let loaded = store.load().await.ok().flatten();
        assert_eq!(loaded, Some(SocialState::default()));
    }
}
