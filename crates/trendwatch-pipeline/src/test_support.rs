//! Fixtures shared by the pipeline's unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use trendwatch_collectors::{AdapterOutcome, RawEntry, SourceCollector};
use trendwatch_core::{Keyword, KeywordCategory, NewItem, Source, SourceKind};

pub(crate) fn keyword(id: i64, name: &str) -> Keyword {
    Keyword {
        id,
        name: name.to_string(),
        category: KeywordCategory::Product,
        description: None,
        active: true,
        created_at: Utc::now(),
    }
}

pub(crate) fn source(id: i64, name: &str, source_type: &str) -> Source {
    Source {
        id,
        name: name.to_string(),
        source_type: source_type.to_string(),
        url: String::new(),
        notes: None,
        active: true,
        created_at: Utc::now(),
    }
}

pub(crate) fn mention(source_name: &str, keyword_name: &str, n: usize) -> NewItem {
    NewItem {
        source_name: source_name.to_string(),
        source_type: "news".to_string(),
        keyword_name: keyword_name.to_string(),
        keyword_id: 1,
        title: format!("{keyword_name} mention {n}"),
        url: format!("https://example.com/{keyword_name}/{n}"),
        content: String::new(),
        published_at: None,
        collected_at: Utc::now(),
    }
}

/// Collector whose outcome for each call is computed by a closure.
pub(crate) struct ScriptedCollector<F>(pub F);

#[async_trait]
impl<F> SourceCollector for ScriptedCollector<F>
where
    F: Fn(SourceKind, &Source, &Keyword) -> AdapterOutcome + Send + Sync,
{
    async fn collect(&self, kind: SourceKind, source: &Source, keyword: &Keyword) -> AdapterOutcome {
        (self.0)(kind, source, keyword)
    }
}

/// `count` entries for `(source, keyword)`, as an adapter would return them.
pub(crate) fn collected(
    source: &Source,
    keyword: &Keyword,
    count: usize,
    at: DateTime<Utc>,
) -> AdapterOutcome {
    let items = (0..count)
        .filter_map(|n| {
            RawEntry::new(
                &format!("{} {n}", keyword.name),
                &format!("https://example.com/{}/{n}", source.id),
            )
        })
        .map(|entry| entry.into_item(source, keyword, at))
        .collect();
    AdapterOutcome::Collected(items)
}

/// Every call yields `count` fresh entries.
pub(crate) fn fixed_collector(count: usize) -> impl SourceCollector {
    ScriptedCollector(move |_: SourceKind, s: &Source, k: &Keyword| {
        collected(s, k, count, Utc::now())
    })
}
