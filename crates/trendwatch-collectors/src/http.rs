//! Shared HTTP client and text helpers used by every adapter.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use scraper::{ElementRef, Html};
use url::Url;

use crate::error::CollectorError;
use crate::outcome::FailureReason;

/// Build the client shared by all adapters for one run.
///
/// `timeout_secs` bounds each request end to end; a timed-out fetch surfaces
/// as an ordinary [`CollectorError::Http`].
///
/// # Errors
///
/// Returns [`CollectorError::Http`] if the underlying `reqwest::Client`
/// cannot be constructed.
pub fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, CollectorError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// GET `url` and return the body, mapping non-2xx statuses to errors.
pub(crate) async fn fetch_text(client: &Client, url: &str) -> Result<String, CollectorError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CollectorError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}

pub(crate) fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, NON_ALPHANUMERIC).to_string()
}

/// Resolve `href` against `base`, keeping only http(s) results.
pub(crate) fn absolutize(href: &str, base: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let base = Url::parse(base).ok()?;
    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// All descendant text of `element`, whitespace-collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Strip markup from an HTML fragment, returning plain text.
pub(crate) fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    collapse_whitespace(&fragment.root_element().text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl From<CollectorError> for FailureReason {
    fn from(err: CollectorError) -> Self {
        match err {
            CollectorError::QuotaExceeded { .. } => FailureReason::QuotaExceeded,
            CollectorError::UnresolvableChannel(url) => FailureReason::UnresolvableChannel(url),
            CollectorError::Xml(_) | CollectorError::Feed(_) | CollectorError::Deserialize { .. } => {
                FailureReason::Parse(err.to_string())
            }
            CollectorError::Http(_) | CollectorError::UnexpectedStatus { .. } => {
                FailureReason::Fetch(err.to_string())
            }
        }
    }
}
