//! Domain records shared by the collectors, the pipeline and the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Surge threshold used when no settings document has been written yet.
pub const DEFAULT_ALERT_THRESHOLD: i32 = 50;
/// Lowest threshold the settings writer accepts.
pub const MIN_ALERT_THRESHOLD: i32 = 10;
/// Highest threshold the settings writer accepts.
pub const MAX_ALERT_THRESHOLD: i32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCategory {
    Product,
    Brand,
    Trend,
    Event,
    Other,
}

impl KeywordCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            KeywordCategory::Product => "product",
            KeywordCategory::Brand => "brand",
            KeywordCategory::Trend => "trend",
            KeywordCategory::Event => "event",
            KeywordCategory::Other => "other",
        }
    }

    /// Parse a stored category string. Unknown values yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "product" => Some(KeywordCategory::Product),
            "brand" => Some(KeywordCategory::Brand),
            "trend" => Some(KeywordCategory::Trend),
            "event" => Some(KeywordCategory::Event),
            "other" => Some(KeywordCategory::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of adapter kinds a source can be collected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    News,
    Community,
    Video,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::News => "news",
            SourceKind::Community => "community",
            SourceKind::Video => "video",
        }
    }

    /// Parse a source `type` string. `youtube` is accepted as an alias of
    /// `video`, matching rows written by older admin tooling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "news" => Some(SourceKind::News),
            "community" => Some(SourceKind::Community),
            "video" | "youtube" => Some(SourceKind::Video),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: i64,
    pub name: String,
    pub category: KeywordCategory,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A site or channel that keywords are collected from.
///
/// `source_type` is kept as the raw stored string so that rows with an
/// unsupported type still load; [`Source::kind`] resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub source_type: String,
    pub url: String,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Source {
    #[must_use]
    pub fn kind(&self) -> Option<SourceKind> {
        SourceKind::parse(&self.source_type)
    }
}

/// A collected mention, ready to be written to the store.
///
/// The insertion `timestamp` is assigned by the store, not the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub source_name: String,
    pub source_type: String,
    pub keyword_name: String,
    pub keyword_id: i64,
    pub title: String,
    pub url: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
    pub collected_at: DateTime<Utc>,
}

/// A stored mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub source_name: String,
    pub source_type: String,
    pub keyword_name: String,
    pub keyword_id: i64,
    pub title: String,
    pub url: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
    pub collected_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

/// Singleton alert configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Minimum percentage change that raises an alert.
    pub threshold: i32,
    pub email: Option<String>,
    pub webhook: Option<String>,
    pub enabled: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ALERT_THRESHOLD,
            email: None,
            webhook: None,
            enabled: true,
            updated_at: None,
        }
    }
}

/// A partial write to [`AlertSettings`]; `None` fields keep their stored value.
///
/// An empty `email` or `webhook` string clears that channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettingsUpdate {
    pub threshold: Option<i32>,
    pub email: Option<String>,
    pub webhook: Option<String>,
    pub enabled: Option<bool>,
}

impl AlertSettingsUpdate {
    /// Check the administrative bounds on the update.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first out-of-range field.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(threshold) = self.threshold {
            if !(MIN_ALERT_THRESHOLD..=MAX_ALERT_THRESHOLD).contains(&threshold) {
                return Err(format!(
                    "threshold {threshold} is outside [{MIN_ALERT_THRESHOLD}, {MAX_ALERT_THRESHOLD}]"
                ));
            }
        }
        if let Some(webhook) = self.webhook.as_deref().filter(|w| !w.is_empty()) {
            if !(webhook.starts_with("http://") || webhook.starts_with("https://")) {
                return Err(format!("webhook '{webhook}' must be an http(s) URL"));
            }
        }
        Ok(())
    }

    /// Merge this update over `current`, returning the new settings.
    #[must_use]
    pub fn apply(&self, current: &AlertSettings) -> AlertSettings {
        let channel = |update: &Option<String>, existing: &Option<String>| match update {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_string()),
            None => existing.clone(),
        };
        AlertSettings {
            threshold: self.threshold.unwrap_or(current.threshold),
            email: channel(&self.email, &current.email),
            webhook: channel(&self.webhook, &current.webhook),
            enabled: self.enabled.unwrap_or(current.enabled),
            updated_at: current.updated_at,
        }
    }
}

/// A detected mention surge for one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub keyword: String,
    pub recent_count: u64,
    /// Previous-window count, floored at 1.
    pub previous_count: u64,
    pub percentage_change: i64,
    /// Distinct contributing source names, in order of first appearance.
    pub sources: Vec<String>,
}
