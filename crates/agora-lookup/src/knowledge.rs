//! Encyclopedia knowledge lookup.
//!
//! A lookup is two HTTP calls with no retry: a `MediaWiki` search for the
//! topic, then the REST page summary of the best hit. The result is
//! normalized to a [`KnowledgeSummary`] with the summary text capped at a
//! fixed number of characters.
//!
//! The response extractors are plain functions over [`serde_json::Value`]
//! so they can be tested without a network.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use agora_types::KnowledgeSummary;

use crate::error::LookupError;

/// Default `MediaWiki` action API endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Default REST page-summary base URL (the title is appended).
pub const DEFAULT_SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

/// Page URL base used when a summary carries no canonical link.
const PAGE_URL_BASE: &str = "https://en.wikipedia.org/wiki";

/// Default cap on summary length, in characters.
pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 450;

/// Anything that can turn a topic into a [`KnowledgeSummary`].
///
/// The session depends on this rather than on [`KnowledgeClient`] so that
/// tests can supply canned answers.
pub trait KnowledgeSource: Send + Sync {
    /// Look up `topic`.
    fn lookup(&self, topic: &str)
    -> impl Future<Output = Result<KnowledgeSummary, LookupError>> + Send;
}

/// Connection settings for [`KnowledgeClient`].
#[derive(Debug, Clone)]
pub struct KnowledgeSettings {
    /// `MediaWiki` action API endpoint.
    pub search_url: String,
    /// REST page-summary base URL.
    pub summary_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum summary length in characters, ellipsis included.
    pub summary_max_chars: usize,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            search_url: String::from(DEFAULT_SEARCH_URL),
            summary_url: String::from(DEFAULT_SUMMARY_URL),
            timeout: Duration::from_secs(8),
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
        }
    }
}

/// HTTP client for the encyclopedia search and summary endpoints.
pub struct KnowledgeClient {
    client: reqwest::Client,
    settings: KnowledgeSettings,
}

impl KnowledgeClient {
    /// Build a client with the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Request`] if the HTTP client cannot be built.
    pub fn new(settings: KnowledgeSettings) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    /// Find the best-matching page title for `topic`.
    async fn search(&self, topic: &str) -> Result<String, LookupError> {
        let response = self
            .client
            .get(&self.settings.search_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", topic),
                ("srlimit", "1"),
                ("format", "json"),
                ("origin", "*"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                stage: "search",
                status: status.as_u16(),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(format!("search response: {e}")))?;
        parse_search_response(&json, topic)
    }

    /// Fetch the summary for a page title.
    async fn summary(&self, title: &str) -> Result<KnowledgeSummary, LookupError> {
        let url = format!(
            "{}/{}",
            self.settings.summary_url.trim_end_matches('/'),
            page_slug(title)
        );
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                stage: "summary",
                status: status.as_u16(),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(format!("summary response: {e}")))?;
        parse_summary_response(&json, title, self.settings.summary_max_chars)
    }
}

impl KnowledgeSource for KnowledgeClient {
    async fn lookup(&self, topic: &str) -> Result<KnowledgeSummary, LookupError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(LookupError::EmptyTopic);
        }
        let title = self.search(topic).await?;
        tracing::debug!(topic, title = %title, "Knowledge search hit");
        self.summary(&title).await
    }
}

/// URL path segment for a page title: spaces become underscores, the rest
/// is percent-encoded.
pub fn page_slug(title: &str) -> String {
    urlencoding::encode(&title.replace(' ', "_")).into_owned()
}

/// Extract the first hit's title from a `list=search` response.
pub fn parse_search_response(json: &Value, topic: &str) -> Result<String, LookupError> {
    let hits = json
        .get("query")
        .and_then(|q| q.get("search"))
        .and_then(Value::as_array)
        .ok_or_else(|| LookupError::Decode(String::from("search response missing query.search")))?;

    hits.first()
        .and_then(|hit| hit.get("title"))
        .and_then(Value::as_str)
        .filter(|title| !title.trim().is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| LookupError::NoResults(String::from(topic)))
}

/// Normalize a page-summary response.
///
/// The title falls back to the searched title and the URL to a page link
/// built from it. The summary is required.
pub fn parse_summary_response(
    json: &Value,
    searched_title: &str,
    max_chars: usize,
) -> Result<KnowledgeSummary, LookupError> {
    let title = json
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(searched_title)
        .to_owned();

    let extract = json
        .get("extract")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| LookupError::MissingSummary(title.clone()))?;

    let url = json
        .get("content_urls")
        .and_then(|c| c.get("desktop"))
        .and_then(|d| d.get("page"))
        .and_then(Value::as_str)
        .map_or_else(|| format!("{PAGE_URL_BASE}/{}", page_slug(&title)), ToOwned::to_owned);

    Ok(KnowledgeSummary {
        title,
        summary: truncate_summary(extract, max_chars),
        url,
    })
}

/// Cap `text` at `max_chars` characters, ending in an ellipsis when cut.
///
/// Counts `char`s, so multi-byte text is never split mid-character.
pub fn truncate_summary(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let keep = max_chars.saturating_sub(1);
    let mut cut: String = text.chars().take(keep).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('\u{2026}');
    cut
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn search_takes_first_title() {
        let json = json!({
            "query": { "search": [ { "title": "Graph theory" }, { "title": "Graph" } ] }
        });
        assert_eq!(parse_search_response(&json, "graphs").ok().as_deref(), Some("Graph theory"));
    }

    #[test]
    fn empty_search_is_no_results() {
        let json = json!({ "query": { "search": [] } });
        assert!(matches!(
            parse_search_response(&json, "zzqx"),
            Err(LookupError::NoResults(topic)) if topic == "zzqx"
        ));
    }

    #[test]
    fn malformed_search_is_decode_error() {
        assert!(matches!(
            parse_search_response(&json!({ "error": "x" }), "t"),
            Err(LookupError::Decode(_))
        ));
    }

    #[test]
    fn summary_uses_canonical_url() {
        let json = json!({
            "title": "Graph theory",
            "extract": "Graph theory is the study of graphs.",
            "content_urls": { "desktop": { "page": "https://en.wikipedia.org/wiki/Graph_theory" } }
        });
        let summary = parse_summary_response(&json, "Graph theory", 450).ok();
        assert_eq!(
            summary,
            Some(KnowledgeSummary {
                title: String::from("Graph theory"),
                summary: String::from("Graph theory is the study of graphs."),
                url: String::from("https://en.wikipedia.org/wiki/Graph_theory"),
            })
        );
    }

    #[test]
    fn summary_falls_back_to_built_url() {
        let json = json!({ "extract": "Text." });
        let summary = parse_summary_response(&json, "Rust (language)", 450).ok();
        assert_eq!(
            summary.map(|s| s.url),
            Some(String::from("https://en.wikipedia.org/wiki/Rust_%28language%29"))
        );
    }

    #[test]
    fn blank_extract_is_missing_summary() {
        let json = json!({ "title": "Stub", "extract": "   " });
        assert!(matches!(
            parse_summary_response(&json, "Stub", 450),
            Err(LookupError::MissingSummary(title)) if title == "Stub"
        ));
    }

    #[test]
    fn truncation_is_char_safe_and_bounded() {
        let long = "é".repeat(500);
        let cut = truncate_summary(&long, 450);
        assert_eq!(cut.chars().count(), 450);
        assert!(cut.ends_with('\u{2026}'));
        assert_eq!(truncate_summary("short", 450), "short");
    }

    #[test]
    fn slug_encodes_title() {
        assert_eq!(page_slug("C++ templates"), "C%2B%2B_templates");
    }
}
