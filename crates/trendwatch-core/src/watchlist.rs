//! YAML watchlist: the seed set of keywords and sources.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{KeywordCategory, SourceKind};
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    pub name: String,
    #[serde(default = "default_category")]
    pub category: KeywordCategory,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub url: String,
    pub notes: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct WatchlistFile {
    #[serde(default)]
    pub keywords: Vec<KeywordConfig>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

fn default_category() -> KeywordCategory {
    KeywordCategory::Other
}

fn default_active() -> bool {
    true
}

/// Load and validate the watchlist from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_watchlist(path: &Path) -> Result<WatchlistFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::WatchlistFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let watchlist: WatchlistFile =
        serde_yaml::from_str(&content).map_err(ConfigError::WatchlistFileParse)?;

    validate_watchlist(&watchlist)?;

    Ok(watchlist)
}

fn validate_watchlist(watchlist: &WatchlistFile) -> Result<(), ConfigError> {
    let mut seen_keywords = HashSet::new();
    for keyword in &watchlist.keywords {
        let name = keyword.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "keyword name must be non-empty".to_string(),
            ));
        }
        if !seen_keywords.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate keyword: '{}'",
                keyword.name
            )));
        }
    }

    let mut seen_names = HashSet::new();
    let mut seen_urls = HashSet::new();
    for source in &watchlist.sources {
        if source.name.trim().is_empty() || source.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name and url must be non-empty".to_string(),
            ));
        }
        if SourceKind::parse(&source.source_type).is_none() {
            return Err(ConfigError::Validation(format!(
                "source '{}' has unknown type '{}'; must be news, community, or video",
                source.name, source.source_type
            )));
        }
        if !seen_names.insert(source.name.trim().to_string()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }
        if !seen_urls.insert(source.url.trim().to_string()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source url: '{}' (from source '{}')",
                source.url, source.name
            )));
        }
    }

    Ok(())
}
