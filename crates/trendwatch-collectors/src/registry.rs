//! Maps a resolved [`SourceKind`] to the adapter that collects it.

use async_trait::async_trait;
use trendwatch_core::{AppConfig, Keyword, Source, SourceKind};

use crate::community::CommunityAdapter;
use crate::error::CollectorError;
use crate::http::build_client;
use crate::news::NewsAdapter;
use crate::outcome::AdapterOutcome;
use crate::video::VideoAdapter;

/// Anything that can run one `(source, keyword)` collection.
///
/// The orchestrator depends on this rather than on [`Registry`] directly so
/// that runs can be exercised without network access.
#[async_trait]
pub trait SourceCollector: Send + Sync {
    async fn collect(&self, kind: SourceKind, source: &Source, keyword: &Keyword)
        -> AdapterOutcome;
}

/// Settings shared by every adapter in a run.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub youtube_api_key: Option<String>,
    pub youtube_feed_fallback: bool,
}

impl CollectorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch_timeout_secs,
            user_agent: config.user_agent.clone(),
            youtube_api_key: config.youtube_api_key.clone(),
            youtube_feed_fallback: config.youtube_feed_fallback,
        }
    }
}

/// One adapter per [`SourceKind`].
pub struct Registry {
    news: NewsAdapter,
    community: CommunityAdapter,
    video: VideoAdapter,
}

impl Registry {
    /// Build every adapter around one shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &CollectorSettings) -> Result<Self, CollectorError> {
        let client = build_client(settings.timeout_secs, &settings.user_agent)?;
        Ok(Self {
            news: NewsAdapter::new(client.clone()),
            community: CommunityAdapter::new(client.clone()),
            video: VideoAdapter::new(client, settings.youtube_api_key.clone())
                .with_feed_fallback(settings.youtube_feed_fallback),
        })
    }

    #[must_use]
    pub fn from_adapters(news: NewsAdapter, community: CommunityAdapter, video: VideoAdapter) -> Self {
        Self {
            news,
            community,
            video,
        }
    }
}

#[async_trait]
impl SourceCollector for Registry {
    async fn collect(
        &self,
        kind: SourceKind,
        source: &Source,
        keyword: &Keyword,
    ) -> AdapterOutcome {
        match kind {
            SourceKind::News => self.news.collect(source, keyword).await,
            SourceKind::Community => self.community.collect(source, keyword).await,
            SourceKind::Video => self.video.collect(source, keyword).await,
        }
    }
}
