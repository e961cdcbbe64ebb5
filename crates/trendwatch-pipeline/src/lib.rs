//! Collection runs and trend analysis.
//!
//! [`run_collection`] fans one run out over every active source;
//! [`analyze_trends`] buckets the stored items into two windows and runs
//! surge detection; [`run_cycle`] chains both and delivers alerts.

pub mod aggregator;
pub mod cycle;
pub mod detector;
pub mod error;
pub mod memory;
pub mod notifier;
pub mod orchestrator;
pub mod store;

#[cfg(test)]
mod test_support;

pub use aggregator::{bucket, load_windows, KeywordWindow, TrendWindows, WINDOW_HOURS};
pub use cycle::{
    analyze_and_notify, analyze_trends, evaluate, run_collection_audited, run_cycle, CycleReport,
    TrendReport, Trigger,
};
pub use detector::{detect_surges, percentage_change};
pub use error::{NotifyError, PipelineError, StoreError};
pub use memory::MemoryStore;
pub use notifier::{alert_message, DispatchReport, LogMailer, Mailer, Notifier};
pub use orchestrator::{run_collection, CollectionSummary};
pub use store::{PgStore, TrendStore};
