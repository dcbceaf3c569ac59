//! Persistence boundary for the Agora social state.
//!
//! The social state is one JSON document. Loading is lenient: a document
//! with missing, extra or wrongly typed fields still loads, with whatever
//! could not be read replaced by defaults. Hydration against the roster
//! then restores referential integrity.
//!
//! # Modules
//!
//! - [`store`] -- [`StateStore`] trait, [`FileStore`] and [`MemoryStore`]
//! - [`decode`] -- Field-wise lenient decoding
//! - [`error`] -- Error types ([`StoreError`])

pub mod decode;
pub mod error;
pub mod store;

// Re-export primary types for convenience.
pub use decode::{decode_state, decode_value};
pub use error::StoreError;
pub use store::{FileStore, MemoryStore, STORAGE_KEY, StateStore};
