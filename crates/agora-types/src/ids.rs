//! Type-safe identifier wrappers.
//!
//! Agent identifiers come from the external agent registry and are opaque
//! strings. Every entity created inside the social simulation (posts,
//! friendships, claims, learning logs) gets a strongly-typed [`Uuid`]
//! wrapper so identifiers cannot be mixed at compile time.
//!
//! Interactive mutations use UUID v7 (time-ordered). The autonomous stepper
//! draws identifiers from its injected random source via
//! [`PostId::from_random_bytes`] and friends so that a seeded run is fully
//! reproducible. Seed posts created during hydration use name-based UUID v5
//! identifiers so hydration stays a pure function.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Namespace for name-based (v5) identifiers minted by hydration.
const SEED_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_0c3e_4b52_4d7a_9e21_5c8b_77d0_a3f4);

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Create an identifier from 16 caller-supplied random bytes (UUID v4 layout).
            pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
                Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }

            /// Create a deterministic identifier from a name (UUID v5).
            pub fn from_name(name: &str) -> Self {
                Self(Uuid::new_v5(&SEED_NAMESPACE, name.as_bytes()))
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a post in the social feed.
    PostId
}

define_id! {
    /// Unique identifier for a friendship record between two agents.
    FriendshipId
}

define_id! {
    /// Unique identifier for a skill claim.
    ClaimId
}

define_id! {
    /// Unique identifier for a learning log entry.
    LearningLogId
}

/// Identifier of an agent, as assigned by the external agent registry.
///
/// The registry owns the id space, so this is an opaque string rather than
/// a UUID. Ordering is lexicographic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentId(pub String);

impl AgentId {
    /// Wrap a registry identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(String::from(id))
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
