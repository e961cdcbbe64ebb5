//! In-memory [`TrendStore`] for tests and offline runs. Thread-safe.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use trendwatch_core::{AlertSettings, Item, Keyword, NewItem, Source};
use trendwatch_db::RunCounts;

use crate::cycle::Trigger;
use crate::error::StoreError;
use crate::store::TrendStore;

/// An audit record kept by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRun {
    pub id: i64,
    pub trigger: Trigger,
    pub status: &'static str,
    pub counts: Option<RunCounts>,
    pub error: Option<String>,
}

#[derive(Default)]
struct State {
    keywords: Vec<Keyword>,
    sources: Vec<Source>,
    items: Vec<Item>,
    settings: Option<AlertSettings>,
    runs: Vec<MemoryRun>,
    fail_config: bool,
    fail_writes_for: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_keywords(self, keywords: Vec<Keyword>) -> Self {
        self.lock().keywords = keywords;
        self
    }

    #[must_use]
    pub fn with_sources(self, sources: Vec<Source>) -> Self {
        self.lock().sources = sources;
        self
    }

    #[must_use]
    pub fn with_settings(self, settings: AlertSettings) -> Self {
        self.lock().settings = Some(settings);
        self
    }

    /// Make the keyword/source queries fail.
    #[must_use]
    pub fn failing_config(self) -> Self {
        self.lock().fail_config = true;
        self
    }

    /// Make batch writes for `source_name` fail.
    #[must_use]
    pub fn failing_writes_for(self, source_name: &str) -> Self {
        self.lock().fail_writes_for.insert(source_name.to_string());
        self
    }

    /// Store an item with an explicit store timestamp.
    pub fn insert_at(&self, item: NewItem, timestamp: DateTime<Utc>) {
        let mut state = self.lock();
        let id = i64::try_from(state.items.len()).unwrap_or(i64::MAX) + 1;
        state.items.push(stored(item, id, timestamp));
    }

    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.lock().items.clone()
    }

    #[must_use]
    pub fn runs(&self) -> Vec<MemoryRun> {
        self.lock().runs.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked mid-write.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn update_run(&self, run_id: i64, apply: impl FnOnce(&mut MemoryRun)) -> Result<(), StoreError> {
        let mut state = self.lock();
        let run = state
            .runs
            .iter_mut()
            .find(|r| r.id == run_id && r.status == "running")
            .ok_or_else(|| StoreError::Unavailable(format!("run {run_id} is not running")))?;
        apply(run);
        Ok(())
    }
}

fn stored(item: NewItem, id: i64, timestamp: DateTime<Utc>) -> Item {
    Item {
        id,
        source_name: item.source_name,
        source_type: item.source_type,
        keyword_name: item.keyword_name,
        keyword_id: item.keyword_id,
        title: item.title,
        url: item.url,
        content: item.content,
        published_at: item.published_at,
        collected_at: item.collected_at,
        timestamp,
    }
}

#[async_trait]
impl TrendStore for MemoryStore {
    async fn active_keywords(&self) -> Result<Vec<Keyword>, StoreError> {
        let state = self.lock();
        if state.fail_config {
            return Err(StoreError::Unavailable("keywords query failed".to_string()));
        }
        Ok(state.keywords.iter().filter(|k| k.active).cloned().collect())
    }

    async fn active_sources(&self) -> Result<Vec<Source>, StoreError> {
        let state = self.lock();
        if state.fail_config {
            return Err(StoreError::Unavailable("sources query failed".to_string()));
        }
        Ok(state.sources.iter().filter(|s| s.active).cloned().collect())
    }

    async fn write_items(&self, items: &[NewItem]) -> Result<usize, StoreError> {
        let mut state = self.lock();
        if items
            .iter()
            .any(|item| state.fail_writes_for.contains(&item.source_name))
        {
            return Err(StoreError::Unavailable("batch write rejected".to_string()));
        }
        let now = Utc::now();
        for item in items {
            let id = i64::try_from(state.items.len()).unwrap_or(i64::MAX) + 1;
            state.items.push(stored(item.clone(), id, now));
        }
        Ok(items.len())
    }

    async fn items_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Item>, StoreError> {
        let state = self.lock();
        let mut items: Vec<Item> = state
            .items
            .iter()
            .filter(|item| item.timestamp >= start && item.timestamp < end)
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.timestamp, item.id));
        Ok(items)
    }

    async fn recent_items(
        &self,
        keyword: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Item>, StoreError> {
        let state = self.lock();
        let mut items: Vec<Item> = state
            .items
            .iter()
            .filter(|item| keyword.is_none_or(|k| item.keyword_name == k))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        items.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(items)
    }

    async fn alert_settings(&self) -> Result<AlertSettings, StoreError> {
        Ok(self.lock().settings.clone().unwrap_or_default())
    }

    async fn begin_run(&self, trigger: Trigger) -> Result<i64, StoreError> {
        let mut state = self.lock();
        let id = i64::try_from(state.runs.len()).unwrap_or(i64::MAX) + 1;
        state.runs.push(MemoryRun {
            id,
            trigger,
            status: "running",
            counts: None,
            error: None,
        });
        Ok(id)
    }

    async fn complete_run(&self, run_id: i64, counts: RunCounts) -> Result<(), StoreError> {
        self.update_run(run_id, |run| {
            run.status = "succeeded";
            run.counts = Some(counts);
        })
    }

    async fn fail_run(&self, run_id: i64, error: &str) -> Result<(), StoreError> {
        self.update_run(run_id, |run| {
            run.status = "failed";
            run.error = Some(error.to_string());
        })
    }
}
