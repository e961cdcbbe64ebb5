//! Video adapter: recent uploads from one `YouTube` channel matching a keyword.
//!
//! The channel comes from the source URL, either a `UC…` channel id or an
//! `@handle` that is resolved through the keyed search endpoint. Without an
//! API key the adapter is disabled for the whole run.

use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use trendwatch_core::{Keyword, Source};

use crate::error::CollectorError;
use crate::http::{fetch_text, strip_html};
use crate::outcome::{settle, AdapterOutcome, FailureReason, RawEntry, MAX_ENTRIES};
use crate::recency_cutoff;

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const YOUTUBE_FEED_BASE: &str = "https://www.youtube.com";

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([a-zA-Z0-9_-]+)").expect("valid regex"));

/// How a source URL names its channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Id(String),
    Handle(String),
}

/// Extract the channel reference from a source URL.
///
/// Accepts a bare `UC…` id, a `/channel/UC…` URL, or anything containing an
/// `@handle`.
#[must_use]
pub fn channel_ref(raw: &str) -> Option<ChannelRef> {
    let raw = raw.trim();
    if raw.starts_with("UC") {
        return Some(ChannelRef::Id(raw.to_string()));
    }

    if let Ok(parsed) = url::Url::parse(raw) {
        if let Some(segments) = parsed.path_segments() {
            let segments: Vec<&str> = segments.collect();
            if let Some(pos) = segments.iter().position(|s| *s == "channel") {
                if let Some(id) = segments.get(pos + 1).filter(|s| s.starts_with("UC")) {
                    return Some(ChannelRef::Id((*id).to_string()));
                }
            }
        }
    }

    HANDLE_RE
        .captures(raw)
        .map(|caps| ChannelRef::Handle(caps[1].to_string()))
}

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

// ---------------------------------------------------------------------------
// API response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: SearchItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    description: Option<String>,
    published_at: Option<DateTime<Utc>>,
    channel_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct VideoAdapter {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    feed_base: String,
    feed_fallback: bool,
}

impl VideoAdapter {
    /// Create the adapter. A missing key is warned about once here; every
    /// later call returns [`FailureReason::MissingCredentials`].
    #[must_use]
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("YOUTUBE_API_KEY is not set; video sources are disabled for this run");
        }
        Self {
            client,
            api_key,
            api_base: YOUTUBE_API_BASE.to_string(),
            feed_base: YOUTUBE_FEED_BASE.to_string(),
            feed_fallback: false,
        }
    }

    /// Point the adapter at alternate origins (used by tests).
    #[must_use]
    pub fn with_base_urls(mut self, api_base: &str, feed_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.feed_base = feed_base.trim_end_matches('/').to_string();
        self
    }

    /// When the API reports quota exhaustion, read the channel's public
    /// upload feed instead. Only channels given by id can fall back.
    #[must_use]
    pub fn with_feed_fallback(mut self, enabled: bool) -> Self {
        self.feed_fallback = enabled;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Collect recent uploads matching `keyword` from the source's channel.
    pub async fn collect(&self, source: &Source, keyword: &Keyword) -> AdapterOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            return AdapterOutcome::Failed(FailureReason::MissingCredentials);
        };

        let Some(channel) = channel_ref(&source.url) else {
            tracing::warn!(source = %source.name, url = %source.url, "cannot extract channel from source url");
            return AdapterOutcome::Failed(FailureReason::UnresolvableChannel(source.url.clone()));
        };

        let now = Utc::now();
        let mut result = self.search(api_key, &channel, &keyword.name, now).await;

        let quota_hit = matches!(result, Err(CollectorError::QuotaExceeded { .. }));
        if quota_hit && self.feed_fallback {
            if let ChannelRef::Id(id) = &channel {
                tracing::warn!(
                    source = %source.name,
                    channel = %id,
                    "video API quota exceeded; reading channel feed instead"
                );
                result = self.fetch_channel_feed(id, &keyword.name, now).await;
            }
        }

        settle(source, keyword, "youtube", result, now)
    }

    async fn search(
        &self,
        api_key: &str,
        channel: &ChannelRef,
        keyword: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RawEntry>, CollectorError> {
        let channel_id = self.resolve_channel_id(api_key, channel).await?;
        let published_after = recency_cutoff(now).to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = MAX_ENTRIES.to_string();

        let response = self
            .get_search(&[
                ("key", api_key),
                ("channelId", channel_id.as_str()),
                ("q", keyword),
                ("part", "snippet"),
                ("type", "video"),
                ("order", "date"),
                ("publishedAfter", published_after.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .await?;

        let entries = response
            .items
            .into_iter()
            .take(MAX_ENTRIES)
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let snippet = item.snippet?;
                // Snippet text arrives HTML-entity escaped.
                let title = strip_html(&snippet.title.unwrap_or_default());
                let description = strip_html(&snippet.description.unwrap_or_default());
                Some(
                    RawEntry::new(&title, &watch_url(&video_id))?
                        .with_content(&description)
                        .published(snippet.published_at),
                )
            })
            .collect();

        Ok(entries)
    }

    async fn resolve_channel_id(
        &self,
        api_key: &str,
        channel: &ChannelRef,
    ) -> Result<String, CollectorError> {
        let handle = match channel {
            ChannelRef::Id(id) => return Ok(id.clone()),
            ChannelRef::Handle(handle) => handle,
        };

        let response = self
            .get_search(&[
                ("key", api_key),
                ("q", handle.as_str()),
                ("part", "snippet"),
                ("type", "channel"),
                ("maxResults", "1"),
            ])
            .await?;

        response
            .items
            .into_iter()
            .next()
            .and_then(|item| {
                item.snippet
                    .and_then(|s| s.channel_id)
                    .or(item.id.channel_id)
            })
            .ok_or_else(|| CollectorError::UnresolvableChannel(format!("@{handle}")))
    }

    async fn get_search(&self, query: &[(&str, &str)]) -> Result<SearchResponse, CollectorError> {
        let url = format!("{}/search", self.api_base);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN {
            return Err(CollectorError::QuotaExceeded { url });
        }
        if !status.is_success() {
            return Err(CollectorError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| CollectorError::Deserialize {
            context: "youtube search".to_string(),
            source,
        })
    }

    async fn fetch_channel_feed(
        &self,
        channel_id: &str,
        keyword: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RawEntry>, CollectorError> {
        let url = format!("{}/feeds/videos.xml?channel_id={channel_id}", self.feed_base);
        let body = fetch_text(&self.client, &url).await?;
        parse_channel_feed(&body, keyword, now)
    }
}

// ---------------------------------------------------------------------------
// Channel feed
// ---------------------------------------------------------------------------

/// Parse a channel upload feed (Atom).
///
/// Considers the first ten entries and keeps those published within the
/// recency window whose title mentions `keyword` (case-insensitive).
///
/// # Errors
///
/// Returns [`CollectorError::Xml`] if the XML is malformed.
pub fn parse_channel_feed(
    xml: &str,
    keyword: &str,
    now: DateTime<Utc>,
) -> Result<Vec<RawEntry>, CollectorError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let cutoff = recency_cutoff(now);
    let needle = keyword.to_lowercase();

    let mut entries = Vec::new();
    let mut seen = 0usize;
    let mut in_entry = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut video_id = String::new();
    let mut published = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "entry" {
                    in_entry = true;
                    title.clear();
                    video_id.clear();
                    published.clear();
                }
                current_tag = name;
            }
            Ok(Event::Text(e)) => {
                if in_entry {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    match current_tag.as_str() {
                        "title" => title = text,
                        "yt:videoId" => video_id = text,
                        "published" => published = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                current_tag.clear();
                if e.name().as_ref() == b"entry" && in_entry {
                    in_entry = false;
                    seen += 1;

                    let published_at = DateTime::parse_from_rfc3339(&published)
                        .ok()
                        .map(|d| d.with_timezone(&Utc));
                    let recent = published_at.is_some_and(|at| at >= cutoff);
                    if recent && title.to_lowercase().contains(&needle) && !video_id.is_empty() {
                        if let Some(entry) = RawEntry::new(&title, &watch_url(&video_id)) {
                            entries.push(entry.published(published_at));
                        }
                    }

                    if seen >= MAX_ENTRIES {
                        break;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CollectorError::Xml(e)),
            _ => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
#[path = "video_test.rs"]
mod tests;
