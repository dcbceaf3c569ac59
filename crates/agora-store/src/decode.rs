//! Lenient decoding of persisted state.
//!
//! A stored document may come from an older build, a hand edit or a
//! partial write. Nothing in it is trusted: every top-level field is read
//! on its own, list entries that do not parse are dropped one by one, and
//! struct-shaped fields keep whatever sub-fields still parse. Whatever is
//! left is repaired by hydration against the live roster.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use agora_types::{AgentId, LabState, SocialProfile, SocialState};

/// Decode a raw JSON document. Invalid JSON yields an empty state.
pub fn decode_state(raw: &str) -> SocialState {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => decode_value(&value),
        Err(e) => {
            warn!(error = %e, "Stored state is not valid JSON, starting empty");
            SocialState::default()
        }
    }
}

/// Decode an already-parsed JSON value field by field.
pub fn decode_value(value: &Value) -> SocialState {
    let Some(obj) = value.as_object() else {
        warn!("Stored state is not a JSON object, starting empty");
        return SocialState::default();
    };

    SocialState {
        current_actor_id: field(obj, "current_actor_id"),
        focus_agent_id: field(obj, "focus_agent_id"),
        profiles: profiles(obj),
        posts: list(obj, "posts"),
        friendships: list(obj, "friendships"),
        claims: list(obj, "claims"),
        learning_logs: list(obj, "learning_logs"),
        lab: obj
            .get("lab")
            .map_or_else(LabState::default, |lab| merge_fields(lab, "lab")),
    }
}

/// Decode a single field, defaulting when absent or malformed.
fn field<T: DeserializeOwned + Default>(obj: &Map<String, Value>, key: &str) -> T {
    let Some(raw) = obj.get(key) else {
        return T::default();
    };
    serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
        warn!(field = key, error = %e, "Dropping malformed stored field");
        T::default()
    })
}

/// Decode a list, keeping the entries that parse.
fn list<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Vec<T> {
    let Some(raw) = obj.get(key) else {
        return Vec::new();
    };
    let Some(items) = raw.as_array() else {
        warn!(field = key, "Stored field is not a list, dropping it");
        return Vec::new();
    };

    let decoded: Vec<T> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    let dropped = items.len().saturating_sub(decoded.len());
    if dropped > 0 {
        warn!(field = key, dropped, kept = decoded.len(), "Dropped malformed stored entries");
    }
    decoded
}

/// Decode the profile map entry by entry.
fn profiles(obj: &Map<String, Value>) -> BTreeMap<AgentId, SocialProfile> {
    let Some(raw) = obj.get("profiles") else {
        return BTreeMap::new();
    };
    let Some(entries) = raw.as_object() else {
        warn!(field = "profiles", "Stored field is not a map, dropping it");
        return BTreeMap::new();
    };
    entries
        .iter()
        .map(|(id, profile)| (AgentId::from(id.as_str()), merge_fields(profile, "profile")))
        .collect()
}

/// Overlay the sub-fields of `value` that parse onto `T::default()`.
///
/// Each candidate sub-field is tried against the accumulated object; one
/// that breaks deserialization is reverted to its default. Unknown keys
/// are ignored. Meant for small structs marked `#[serde(default)]`.
pub fn merge_fields<T>(value: &Value, what: &str) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    let Some(input) = value.as_object() else {
        warn!(what, "Stored value is not an object, using defaults");
        return T::default();
    };
    let Ok(Value::Object(mut merged)) = serde_json::to_value(T::default()) else {
        return T::default();
    };

    for (key, candidate) in input {
        let Some(previous) = merged.get(key).cloned() else {
            continue;
        };
        merged.insert(key.clone(), candidate.clone());
        if serde_json::from_value::<T>(Value::Object(merged.clone())).is_err() {
            warn!(what, field = %key, "Dropping malformed stored sub-field");
            merged.insert(key.clone(), previous);
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}
