//! Postgres persistence for keywords, sources, items, alert settings and
//! collection runs.

pub mod alert_settings;
pub mod collection_runs;
mod error;
pub mod items;
pub mod keywords;
mod pool;
pub mod seed;
pub mod sources;

pub use alert_settings::{get_alert_settings, set_alert_settings};
pub use collection_runs::{
    complete_collection_run, create_collection_run, fail_collection_run, get_collection_run,
    list_collection_runs, start_collection_run, CollectionRunRow, RunCounts,
};
pub use error::DbError;
pub use items::{insert_items, list_items_between, list_recent_items, ItemRow};
pub use keywords::{list_active_keywords, list_keywords, set_keyword_active, KeywordRow};
pub use pool::{connect_pool, health_check, run_migrations, PoolConfig};
pub use seed::{seed_watchlist, SeedSummary};
pub use sources::{list_active_sources, list_sources, SourceRow};
