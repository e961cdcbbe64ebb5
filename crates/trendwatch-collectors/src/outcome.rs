//! Adapter results.

use chrono::{DateTime, Utc};
use trendwatch_core::{Keyword, NewItem, Source};

use crate::error::CollectorError;

/// Most entries any single adapter call returns.
pub const MAX_ENTRIES: usize = 10;

/// One search hit as extracted from a page or feed, before it is tied to a
/// source and keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub url: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl RawEntry {
    /// Build an entry, returning `None` when the title or link is blank.
    #[must_use]
    pub fn new(title: &str, url: &str) -> Option<Self> {
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            url: url.to_string(),
            content: String::new(),
            published_at: None,
        })
    }

    #[must_use]
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.trim().to_string();
        self
    }

    #[must_use]
    pub fn published(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.published_at = at;
        self
    }

    /// Attach the source and keyword the entry was collected for.
    #[must_use]
    pub fn into_item(self, source: &Source, keyword: &Keyword, collected_at: DateTime<Utc>) -> NewItem {
        NewItem {
            source_name: source.name.clone(),
            source_type: source.source_type.clone(),
            keyword_name: keyword.name.clone(),
            keyword_id: keyword.id,
            title: self.title,
            url: self.url,
            content: self.content,
            published_at: self.published_at,
            collected_at,
        }
    }
}

/// Why an adapter call produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The source name does not match any site the adapter knows.
    UnknownSubSource(String),
    /// The site only serves results to logged-in members.
    AuthenticationRequired,
    /// The video API key is not configured.
    MissingCredentials,
    /// The video API refused the request with HTTP 403.
    QuotaExceeded,
    /// The source URL does not identify a channel.
    UnresolvableChannel(String),
    /// Network failure, timeout or non-success status.
    Fetch(String),
    /// The response body could not be parsed.
    Parse(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::UnknownSubSource(name) => write!(f, "unknown sub-source '{name}'"),
            FailureReason::AuthenticationRequired => f.write_str("authentication required"),
            FailureReason::MissingCredentials => f.write_str("missing API credentials"),
            FailureReason::QuotaExceeded => f.write_str("API quota exceeded"),
            FailureReason::UnresolvableChannel(url) => {
                write!(f, "cannot resolve channel from '{url}'")
            }
            FailureReason::Fetch(e) => write!(f, "fetch failed: {e}"),
            FailureReason::Parse(e) => write!(f, "parse failed: {e}"),
        }
    }
}

/// Result of one `(source, keyword)` adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterOutcome {
    /// Collection ran; the list may be empty.
    Collected(Vec<NewItem>),
    Failed(FailureReason),
}

impl AdapterOutcome {
    /// The collected items; a failed outcome yields none.
    #[must_use]
    pub fn into_items(self) -> Vec<NewItem> {
        match self {
            AdapterOutcome::Collected(items) => items,
            AdapterOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Turn a fetch result into an outcome, logging either way.
pub(crate) fn settle(
    source: &Source,
    keyword: &Keyword,
    site: &str,
    result: Result<Vec<RawEntry>, CollectorError>,
    collected_at: DateTime<Utc>,
) -> AdapterOutcome {
    match result {
        Ok(entries) => {
            tracing::debug!(
                source = %source.name,
                keyword = %keyword.name,
                site,
                count = entries.len(),
                "collected entries"
            );
            AdapterOutcome::Collected(
                entries
                    .into_iter()
                    .map(|entry| entry.into_item(source, keyword, collected_at))
                    .collect(),
            )
        }
        Err(e) => {
            tracing::warn!(
                source = %source.name,
                keyword = %keyword.name,
                site,
                error = %e,
                "collection failed"
            );
            AdapterOutcome::Failed(e.into())
        }
    }
}
