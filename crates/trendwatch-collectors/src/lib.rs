//! Site adapters for trendwatch.
//!
//! Each adapter fetches one source for one keyword and returns an
//! [`AdapterOutcome`]. Adapters never propagate errors: network, parse and
//! quota failures become [`FailureReason`]s and are logged where they occur.
//! The [`Registry`] maps a source's [`trendwatch_core::SourceKind`] to its
//! adapter.

pub mod community;
pub mod error;
pub mod http;
pub mod news;
pub mod outcome;
pub mod registry;
pub mod video;

use chrono::{DateTime, Duration, Utc};
use scraper::Selector;

pub use community::{CommunityAdapter, CommunitySite};
pub use error::CollectorError;
pub use http::build_client;
pub use news::{NewsAdapter, NewsSite};
pub use outcome::{AdapterOutcome, FailureReason, RawEntry, MAX_ENTRIES};
pub use registry::{CollectorSettings, Registry, SourceCollector};
pub use video::VideoAdapter;

/// How far back feed and video entries may be published and still count.
pub const RECENCY_WINDOW_HOURS: i64 = 2;

pub(crate) fn recency_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(RECENCY_WINDOW_HOURS)
}

/// Parse a CSS selector literal.
///
/// # Panics
///
/// Panics if `css` is not a valid selector; callers pass literals only.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector literal")
}
