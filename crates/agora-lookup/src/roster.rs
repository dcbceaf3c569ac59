//! Agent roster client.
//!
//! The roster is owned by an external registry. This client fetches it and
//! normalizes each record once, at the boundary: null or missing skills
//! become an empty list and a missing enabled flag becomes `true`. Records
//! without an id are skipped, and only the first record per id is kept.
//!
//! When the registry is unreachable or returns something unusable the
//! session falls back to [`default_roster`].

use std::collections::BTreeSet;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use agora_types::{AgentId, RosterAgent};

use crate::error::LookupError;

/// HTTP client for the agent registry.
pub struct RosterClient {
    client: reqwest::Client,
    url: String,
}

impl RosterClient {
    /// Build a client for the roster endpoint at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Request`] if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: String::from(url),
        })
    }

    /// Fetch and normalize the roster.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] on transport failure, a non-success status,
    /// or a body that is not a list of agent records.
    pub async fn fetch(&self) -> Result<Vec<RosterAgent>, LookupError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                stage: "roster",
                status: status.as_u16(),
            });
        }
        let json: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(format!("roster response: {e}")))?;
        parse_roster(&json)
    }

    /// Fetch the roster, or return the built-in default on any failure.
    pub async fn fetch_or_default(&self) -> Vec<RosterAgent> {
        match self.fetch().await {
            Ok(roster) => {
                tracing::info!(agents = roster.len(), "Roster loaded");
                roster
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "Roster unavailable, using default roster");
                default_roster()
            }
        }
    }
}

/// The three agents used when no registry is reachable.
pub fn default_roster() -> Vec<RosterAgent> {
    let agents: [(&str, &str, &str, &[&str]); 3] = [
        (
            "ops-assistant",
            "Ops Assistant",
            "Keeps schedules, reminders and the daily briefing in order.",
            &["scheduling", "briefings"],
        ),
        (
            "research-scout",
            "Research Scout",
            "Digs up background reading and summarizes it.",
            &["research", "summaries"],
        ),
        (
            "inbox-curator",
            "Inbox Curator",
            "Triages mail and drafts short replies.",
            &["email", "drafting"],
        ),
    ];
    agents
        .into_iter()
        .map(|(id, name, description, skills)| RosterAgent {
            id: AgentId::from(id),
            name: String::from(name),
            description: Some(String::from(description)),
            model: None,
            enabled: true,
            skills: skills.iter().map(|s| String::from(*s)).collect(),
        })
        .collect()
}

/// Normalize a roster response.
///
/// Accepts a bare list or an object with an `agents` list.
pub fn parse_roster(json: &Value) -> Result<Vec<RosterAgent>, LookupError> {
    let records = json
        .as_array()
        .or_else(|| json.get("agents").and_then(Value::as_array))
        .ok_or_else(|| LookupError::Decode(String::from("roster is not a list")))?;

    let mut seen = BTreeSet::new();
    let mut roster = Vec::with_capacity(records.len());
    for record in records {
        let Some(agent) = parse_agent(record) else {
            warn!("Skipping roster record without an id");
            continue;
        };
        if seen.insert(agent.id.clone()) {
            roster.push(agent);
        }
    }
    Ok(roster)
}

/// Normalize one record. `None` if it has no usable id.
fn parse_agent(record: &Value) -> Option<RosterAgent> {
    let id = match record.get("id")? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let text = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    };

    Some(RosterAgent {
        name: text("name").unwrap_or_else(|| id.clone()),
        description: text("description"),
        model: text("model"),
        enabled: record.get("enabled").and_then(Value::as_bool).unwrap_or(true),
        skills: record
            .get("skills")
            .and_then(Value::as_array)
            .map(|skills| {
                skills
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
        id: AgentId::from(id),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_are_normalized() {
        let roster = parse_roster(&json!([
            { "id": "a", "name": "Alpha", "skills": null },
            { "id": "b", "name": "Beta", "enabled": false, "skills": ["x", 3, "y"] }
        ]))
        .unwrap_or_default();

        assert_eq!(roster.len(), 2);
        assert!(roster.first().is_some_and(|a| {
            a.enabled && a.skills.is_empty() && a.description.is_none()
        }));
        assert!(roster.get(1).is_some_and(|b| {
            !b.enabled && b.skills == [String::from("x"), String::from("y")]
        }));
    }

    #[test]
    fn records_without_id_are_skipped_and_duplicates_dropped() {
        let roster = parse_roster(&json!({
            "agents": [
                { "name": "No id" },
                { "id": "", "name": "Blank" },
                { "id": 7 },
                { "id": "a", "name": "First" },
                { "id": "a", "name": "Second" }
            ]
        }))
        .unwrap_or_default();
        let names: Vec<&str> = roster.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["7", "First"]);
    }

    #[test]
    fn non_list_is_decode_error() {
        assert!(matches!(parse_roster(&json!("x")), Err(LookupError::Decode(_))));
    }

    #[test]
    fn default_roster_has_three_enabled_agents() {
        let roster = default_roster();
        assert_eq!(roster.len(), 3);
        assert!(roster.iter().all(|a| a.enabled));
    }
}
