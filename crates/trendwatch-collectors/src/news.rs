//! News adapter: Google News RSS search and Naver News search results.

use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::Html;
use trendwatch_core::{Keyword, Source};

use crate::error::CollectorError;
use crate::http::{element_text, encode_query, fetch_text, strip_html};
use crate::outcome::{settle, AdapterOutcome, FailureReason, RawEntry, MAX_ENTRIES};
use crate::{recency_cutoff, selector};

const GOOGLE_NEWS_BASE: &str = "https://news.google.com";
const NAVER_SEARCH_BASE: &str = "https://search.naver.com";

/// The news sites the adapter knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsSite {
    GoogleNews,
    NaverNews,
}

impl NewsSite {
    /// Resolve a source to a site by its name, falling back to its URL host.
    #[must_use]
    pub fn resolve(source: &Source) -> Option<Self> {
        let name = source.name.trim().to_lowercase();
        match name.as_str() {
            "구글 뉴스" | "구글뉴스" | "google news" | "googlenews" => {
                return Some(NewsSite::GoogleNews)
            }
            "네이버 뉴스" | "네이버뉴스" | "naver news" | "navernews" => {
                return Some(NewsSite::NaverNews)
            }
            _ => {}
        }

        let host = url::Url::parse(&source.url).ok()?.host_str()?.to_ascii_lowercase();
        match host.as_str() {
            "news.google.com" => Some(NewsSite::GoogleNews),
            "search.naver.com" | "news.naver.com" => Some(NewsSite::NaverNews),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            NewsSite::GoogleNews => "google_news",
            NewsSite::NaverNews => "naver_news",
        }
    }
}

pub struct NewsAdapter {
    client: Client,
    google_base: String,
    naver_base: String,
}

impl NewsAdapter {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_urls(client, GOOGLE_NEWS_BASE, NAVER_SEARCH_BASE)
    }

    /// Point the adapter at alternate origins (used by tests).
    #[must_use]
    pub fn with_base_urls(client: Client, google_base: &str, naver_base: &str) -> Self {
        Self {
            client,
            google_base: google_base.trim_end_matches('/').to_string(),
            naver_base: naver_base.trim_end_matches('/').to_string(),
        }
    }

    /// Collect news mentions of `keyword` from `source`.
    pub async fn collect(&self, source: &Source, keyword: &Keyword) -> AdapterOutcome {
        let Some(site) = NewsSite::resolve(source) else {
            tracing::warn!(source = %source.name, "unknown news source");
            return AdapterOutcome::Failed(FailureReason::UnknownSubSource(source.name.clone()));
        };

        let now = Utc::now();
        let result = self.fetch_entries(site, &keyword.name, now).await;
        settle(source, keyword, site.label(), result, now)
    }

    async fn fetch_entries(
        &self,
        site: NewsSite,
        keyword: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RawEntry>, CollectorError> {
        let encoded = encode_query(keyword);
        match site {
            NewsSite::GoogleNews => {
                let url = format!(
                    "{}/rss/search?q={encoded}&hl=ko&gl=KR&ceid=KR:ko",
                    self.google_base
                );
                let body = fetch_text(&self.client, &url).await?;
                parse_google_news_rss(&body, now)
            }
            NewsSite::NaverNews => {
                let url = format!(
                    "{}/search.naver?where=news&query={encoded}&sort=1",
                    self.naver_base
                );
                let body = fetch_text(&self.client, &url).await?;
                Ok(parse_naver_news(&body))
            }
        }
    }
}

/// Parse a Google News RSS search feed.
///
/// Only the first ten entries are considered, and of those only entries
/// published within the recency window before `now` are kept.
///
/// # Errors
///
/// Returns [`CollectorError::Feed`] if the body is not a parseable feed.
pub fn parse_google_news_rss(
    xml: &str,
    now: DateTime<Utc>,
) -> Result<Vec<RawEntry>, CollectorError> {
    let feed = feed_rs::parser::parse(xml.as_bytes())?;
    let cutoff = recency_cutoff(now);

    let entries = feed
        .entries
        .into_iter()
        .take(MAX_ENTRIES)
        .filter_map(|entry| {
            let published = entry.published?;
            if published < cutoff {
                return None;
            }
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let link = entry.links.first().map(|l| l.href.clone()).unwrap_or_default();
            let content = entry
                .summary
                .map(|s| strip_html(&s.content))
                .unwrap_or_default();
            Some(
                RawEntry::new(&title, &link)?
                    .with_content(&content)
                    .published(Some(published)),
            )
        })
        .collect();

    Ok(entries)
}

/// Parse a Naver News search results page (newest first).
///
/// There is no recency filter; the page is already sorted by date.
#[must_use]
pub fn parse_naver_news(html: &str) -> Vec<RawEntry> {
    let document = Html::parse_document(html);
    let area = selector(".news_area");
    let title = selector(".news_tit");
    let snippet = selector(".news_dsc");

    document
        .select(&area)
        .take(MAX_ENTRIES)
        .filter_map(|row| {
            let anchor = row.select(&title).next()?;
            let href = anchor.value().attr("href")?;
            let content = row.select(&snippet).next().map(element_text).unwrap_or_default();
            Some(RawEntry::new(&element_text(anchor), href)?.with_content(&content))
        })
        .collect()
}

#[cfg(test)]
#[path = "news_test.rs"]
mod tests;
