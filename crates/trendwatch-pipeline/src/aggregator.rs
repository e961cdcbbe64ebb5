//! Two-window mention counts per keyword.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use trendwatch_core::Item;

use crate::error::StoreError;
use crate::store::TrendStore;

/// Width of each comparison window.
pub const WINDOW_HOURS: i64 = 2;

/// Mentions of one keyword inside one window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordWindow {
    pub count: u64,
    /// Distinct source names, in order of first appearance.
    pub sources: Vec<String>,
}

impl KeywordWindow {
    fn record(&mut self, source_name: &str) {
        self.count += 1;
        if !self.sources.iter().any(|s| s == source_name) {
            self.sources.push(source_name.to_string());
        }
    }
}

/// Recent (`[now-2h, now)`) and previous (`[now-4h, now-2h)`) windows, keyed
/// by keyword name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendWindows {
    pub recent: BTreeMap<String, KeywordWindow>,
    pub previous: BTreeMap<String, KeywordWindow>,
}

/// Bucket `items` by their store timestamp relative to `now`.
///
/// Items outside both windows are ignored. Input order decides the order
/// of each window's source list.
#[must_use]
pub fn bucket(items: &[Item], now: DateTime<Utc>) -> TrendWindows {
    let window = Duration::hours(WINDOW_HOURS);
    let recent_start = now - window;
    let previous_start = recent_start - window;

    let mut windows = TrendWindows::default();
    for item in items {
        let target = if item.timestamp >= recent_start && item.timestamp < now {
            &mut windows.recent
        } else if item.timestamp >= previous_start && item.timestamp < recent_start {
            &mut windows.previous
        } else {
            continue;
        };
        target
            .entry(item.keyword_name.clone())
            .or_default()
            .record(&item.source_name);
    }
    windows
}

/// Load the last two windows' items from `store` and bucket them.
///
/// # Errors
///
/// Returns [`StoreError`] if the items cannot be read.
pub async fn load_windows(
    store: &dyn TrendStore,
    now: DateTime<Utc>,
) -> Result<TrendWindows, StoreError> {
    let start = now - Duration::hours(WINDOW_HOURS * 2);
    let items = store.items_between(start, now).await?;
    let windows = bucket(&items, now);
    tracing::debug!(
        items = items.len(),
        recent_keywords = windows.recent.len(),
        previous_keywords = windows.previous.len(),
        "trend windows loaded"
    );
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::test_support::mention;

    fn item_at(keyword: &str, source: &str, timestamp: DateTime<Utc>) -> Item {
        Item {
            id: 0,
            source_name: source.to_string(),
            source_type: "news".to_string(),
            keyword_name: keyword.to_string(),
            keyword_id: 1,
            title: format!("{keyword} 소식"),
            url: "https://example.com".to_string(),
            content: String::new(),
            published_at: None,
            collected_at: timestamp,
            timestamp,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_boundaries_are_half_open() {
        let now = now();
        let items = vec![
            item_at("A", "s1", now - Duration::hours(2)),
            item_at("A", "s1", now - Duration::hours(2) - Duration::seconds(1)),
            item_at("A", "s1", now - Duration::hours(4)),
            item_at("A", "s1", now - Duration::hours(4) - Duration::seconds(1)),
            item_at("A", "s1", now),
        ];

        let windows = bucket(&items, now);
        assert_eq!(windows.recent["A"].count, 1, "now-2h is recent, now is not");
        assert_eq!(windows.previous["A"].count, 2, "now-4h is previous");
    }

    #[test]
    fn sources_are_distinct_in_first_appearance_order() {
        let now = now();
        let at = now - Duration::minutes(30);
        let items = vec![
            item_at("A", "클리앙", at),
            item_at("A", "네이버 뉴스", at),
            item_at("A", "클리앙", at),
            item_at("A", "뽐뿌", at),
        ];

        let windows = bucket(&items, now);
        assert_eq!(windows.recent["A"].count, 4);
        assert_eq!(windows.recent["A"].sources, vec!["클리앙", "네이버 뉴스", "뽐뿌"]);
        assert!(windows.previous.is_empty());
    }

    #[tokio::test]
    async fn load_windows_reads_the_last_four_hours_from_the_store() {
        let now = now();
        let store = MemoryStore::new();
        store.insert_at(mention("s1", "A", 1), now - Duration::minutes(10));
        store.insert_at(mention("s2", "A", 2), now - Duration::hours(3));
        store.insert_at(mention("s3", "A", 3), now - Duration::hours(5));

        let windows = load_windows(&store, now).await.expect("load");
        assert_eq!(windows.recent["A"].sources, vec!["s1"]);
        assert_eq!(windows.previous["A"].sources, vec!["s2"]);
    }
}
