//! The store seam between the pipeline and persistence.
//!
//! [`PgStore`] is the production implementation over a Postgres pool;
//! [`crate::memory::MemoryStore`] backs tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendwatch_core::{AlertSettings, Item, Keyword, NewItem, Source};
use trendwatch_db::RunCounts;

use crate::cycle::Trigger;
use crate::error::StoreError;

#[async_trait]
pub trait TrendStore: Send + Sync {
    async fn active_keywords(&self) -> Result<Vec<Keyword>, StoreError>;

    /// Active sources of every `type`, including ones no adapter handles.
    async fn active_sources(&self) -> Result<Vec<Source>, StoreError>;

    /// Write one batch atomically; the store stamps each row's `timestamp`.
    async fn write_items(&self, items: &[NewItem]) -> Result<usize, StoreError>;

    /// Items whose store `timestamp` lies in `[start, end)`.
    async fn items_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Item>, StoreError>;

    /// Newest items first, optionally for one keyword.
    async fn recent_items(&self, keyword: Option<&str>, limit: i64)
        -> Result<Vec<Item>, StoreError>;

    /// The alert settings, or the defaults when none were ever written.
    async fn alert_settings(&self) -> Result<AlertSettings, StoreError>;

    /// Open an audit record for a cycle and mark it running.
    async fn begin_run(&self, trigger: Trigger) -> Result<i64, StoreError>;

    async fn complete_run(&self, run_id: i64, counts: RunCounts) -> Result<(), StoreError>;

    async fn fail_run(&self, run_id: i64, error: &str) -> Result<(), StoreError>;
}

/// [`TrendStore`] over the Postgres tables.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TrendStore for PgStore {
    async fn active_keywords(&self) -> Result<Vec<Keyword>, StoreError> {
        let rows = trendwatch_db::list_active_keywords(&self.pool).await?;
        Ok(rows.into_iter().map(Keyword::from).collect())
    }

    async fn active_sources(&self) -> Result<Vec<Source>, StoreError> {
        let rows = trendwatch_db::list_active_sources(&self.pool).await?;
        Ok(rows.into_iter().map(Source::from).collect())
    }

    async fn write_items(&self, items: &[NewItem]) -> Result<usize, StoreError> {
        Ok(trendwatch_db::insert_items(&self.pool, items).await?)
    }

    async fn items_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Item>, StoreError> {
        let rows = trendwatch_db::list_items_between(&self.pool, start, end).await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn recent_items(
        &self,
        keyword: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Item>, StoreError> {
        let rows = trendwatch_db::list_recent_items(&self.pool, keyword, limit).await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn alert_settings(&self) -> Result<AlertSettings, StoreError> {
        Ok(trendwatch_db::get_alert_settings(&self.pool).await?)
    }

    async fn begin_run(&self, trigger: Trigger) -> Result<i64, StoreError> {
        let run = trendwatch_db::create_collection_run(&self.pool, trigger.as_str()).await?;
        trendwatch_db::start_collection_run(&self.pool, run.id).await?;
        Ok(run.id)
    }

    async fn complete_run(&self, run_id: i64, counts: RunCounts) -> Result<(), StoreError> {
        Ok(trendwatch_db::complete_collection_run(&self.pool, run_id, counts).await?)
    }

    async fn fail_run(&self, run_id: i64, error: &str) -> Result<(), StoreError> {
        Ok(trendwatch_db::fail_collection_run(&self.pool, run_id, error).await?)
    }
}
