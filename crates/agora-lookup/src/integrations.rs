//! Integration account client.
//!
//! Lists the cloud accounts connected to the host. Any failure yields an
//! empty list, since integrations are optional.

use std::time::Duration;

use serde_json::Value;

use agora_types::IntegrationAccount;

use crate::error::LookupError;

/// HTTP client for the integration accounts endpoint.
pub struct IntegrationClient {
    client: reqwest::Client,
    url: String,
}

impl IntegrationClient {
    /// Build a client for the accounts endpoint at `url`.
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

    /// Fetch the account list.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] on transport failure, a non-success status,
    /// or a body that is not a list.
    pub async fn fetch(&self) -> Result<Vec<IntegrationAccount>, LookupError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                stage: "accounts",
                status: status.as_u16(),
            });
        }
        let json: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(format!("accounts response: {e}")))?;
        parse_accounts(&json)
    }

    /// Fetch the account list, or an empty list on any failure.
    pub async fn fetch_or_empty(&self) -> Vec<IntegrationAccount> {
        self.fetch().await.unwrap_or_else(|e| {
            tracing::warn!(url = %self.url, error = %e, "Integration accounts unavailable");
            Vec::new()
        })
    }
}

/// Normalize an accounts response. Accepts a bare list or `{ "accounts": [...] }`.
pub fn parse_accounts(json: &Value) -> Result<Vec<IntegrationAccount>, LookupError> {
    let records = json
        .as_array()
        .or_else(|| json.get("accounts").and_then(Value::as_array))
        .ok_or_else(|| LookupError::Decode(String::from("accounts is not a list")))?;

    Ok(records.iter().filter_map(parse_account).collect())
}

fn parse_account(record: &Value) -> Option<IntegrationAccount> {
    let text = |key: &str| record.get(key).and_then(Value::as_str).map(ToOwned::to_owned);
    Some(IntegrationAccount {
        id: text("id")?,
        email: text("email")?,
        display_name: text("display_name").filter(|n| !n.trim().is_empty()),
        status: text("status").unwrap_or_default(),
        scopes: record
            .get("scopes")
            .and_then(Value::as_array)
            .map(|s| s.iter().filter_map(Value::as_str).map(ToOwned::to_owned).collect())
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accounts_parse_with_optional_fields() {
        let accounts = parse_accounts(&json!([
            {
                "id": "acc-1",
                "email": "ops@example.com",
                "display_name": "Ops",
                "status": "CONNECTED",
                "scopes": ["calendar", "mail"]
            },
            { "id": "acc-2", "email": "x@example.com", "status": "revoked" },
            { "email": "no-id@example.com" }
        ]))
        .unwrap_or_default();

        assert_eq!(accounts.len(), 2);
        assert!(accounts.first().is_some_and(|a| a.is_connected() && a.scopes.len() == 2));
        assert!(accounts.get(1).is_some_and(|a| !a.is_connected() && a.scopes.is_empty()));
    }

    #[test]
    fn wrapped_list_is_accepted() {
        let accounts = parse_accounts(&json!({ "accounts": [] }));
        assert!(accounts.is_ok_and(|a| a.is_empty()));
    }
}
