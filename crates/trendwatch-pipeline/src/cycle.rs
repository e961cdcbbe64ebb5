//! End-to-end cycles: collect, aggregate, detect, notify, with a run audit.
//!
//! The scheduler, the manual HTTP trigger and the CLI all go through the
//! functions here so that identical inputs give identical summaries no
//! matter who started the run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use trendwatch_collectors::SourceCollector;
use trendwatch_core::{Alert, AlertSettings, Item};
use trendwatch_db::RunCounts;

use crate::aggregator::{bucket, load_windows, TrendWindows};
use crate::detector::detect_surges;
use crate::error::{PipelineError, StoreError};
use crate::notifier::{DispatchReport, Notifier};
use crate::orchestrator::{run_collection, CollectionSummary};
use crate::store::TrendStore;

/// Who started a run. Recorded on the audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Scheduler,
    Manual,
    Cli,
}

impl Trigger {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Scheduler => "scheduler",
            Trigger::Manual => "manual",
            Trigger::Cli => "cli",
        }
    }
}

/// Current windows and the alerts they raise under the stored settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendReport {
    pub generated_at: DateTime<Utc>,
    pub windows: TrendWindows,
    pub settings: AlertSettings,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub summary: CollectionSummary,
    pub alerts: Vec<Alert>,
    pub dispatch: DispatchReport,
}

/// Alerts for `items` as of `now`. Depends on nothing but its arguments.
#[must_use]
pub fn evaluate(items: &[Item], settings: &AlertSettings, now: DateTime<Utc>) -> Vec<Alert> {
    detect_surges(&bucket(items, now), settings)
}

/// Aggregate stored items around `now` and run surge detection.
///
/// # Errors
///
/// Returns [`StoreError`] if items or settings cannot be read.
pub async fn analyze_trends(
    store: &dyn TrendStore,
    now: DateTime<Utc>,
) -> Result<TrendReport, StoreError> {
    let windows = load_windows(store, now).await?;
    let settings = store.alert_settings().await?;
    let alerts = detect_surges(&windows, &settings);
    Ok(TrendReport {
        generated_at: now,
        windows,
        settings,
        alerts,
    })
}

/// [`analyze_trends`] followed by delivery of any alerts.
///
/// # Errors
///
/// Returns [`StoreError`] if items or settings cannot be read. Delivery
/// failures are logged only.
pub async fn analyze_and_notify(
    store: &dyn TrendStore,
    notifier: &Notifier,
    now: DateTime<Utc>,
) -> Result<(TrendReport, DispatchReport), StoreError> {
    let report = analyze_trends(store, now).await?;
    if report.alerts.is_empty() {
        tracing::info!("no trend surges detected");
        return Ok((report, DispatchReport::default()));
    }

    for alert in &report.alerts {
        tracing::info!(
            keyword = %alert.keyword,
            recent = alert.recent_count,
            previous = alert.previous_count,
            change = alert.percentage_change,
            "trend surge detected"
        );
    }
    let dispatch = notifier.dispatch(&report.alerts, &report.settings).await;
    Ok((report, dispatch))
}

/// Run one collection and record it in the audit log.
///
/// # Errors
///
/// Returns [`PipelineError::ConfigFetch`] when nothing could be collected.
pub async fn run_collection_audited(
    store: &dyn TrendStore,
    collector: &dyn SourceCollector,
    trigger: Trigger,
) -> Result<CollectionSummary, PipelineError> {
    let run_id = open_run(store, trigger).await;
    let result = run_collection(store, collector).await;
    match &result {
        Ok(summary) => close_run(store, run_id, counts(summary, 0)).await,
        Err(e) => fail_run(store, run_id, &e.to_string()).await,
    }
    result
}

/// Collect, then aggregate, detect and notify. Analysis starts only after
/// every source task has settled.
///
/// # Errors
///
/// Returns [`PipelineError::ConfigFetch`] when nothing could be collected,
/// or [`PipelineError::Store`] when the analysis reads fail.
pub async fn run_cycle(
    store: &dyn TrendStore,
    collector: &dyn SourceCollector,
    notifier: &Notifier,
    trigger: Trigger,
) -> Result<CycleReport, PipelineError> {
    let run_id = open_run(store, trigger).await;

    let summary = match run_collection(store, collector).await {
        Ok(summary) => summary,
        Err(e) => {
            fail_run(store, run_id, &e.to_string()).await;
            return Err(e);
        }
    };

    let (report, dispatch) = match analyze_and_notify(store, notifier, Utc::now()).await {
        Ok(done) => done,
        Err(e) => {
            fail_run(store, run_id, &format!("analysis failed: {e}")).await;
            return Err(PipelineError::Store(e));
        }
    };

    close_run(store, run_id, counts(&summary, report.alerts.len())).await;
    Ok(CycleReport {
        summary,
        alerts: report.alerts,
        dispatch,
    })
}

fn counts(summary: &CollectionSummary, alerts: usize) -> RunCounts {
    let clamp = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
    RunCounts {
        successful_sources: clamp(summary.successful),
        failed_sources: clamp(summary.failed),
        items_written: clamp(summary.items_written),
        alerts_raised: clamp(alerts),
    }
}

// Audit writes never decide the outcome of a run.

async fn open_run(store: &dyn TrendStore, trigger: Trigger) -> Option<i64> {
    match store.begin_run(trigger).await {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(trigger = trigger.as_str(), error = %e, "could not record collection run");
            None
        }
    }
}

async fn close_run(store: &dyn TrendStore, run_id: Option<i64>, counts: RunCounts) {
    let Some(id) = run_id else { return };
    if let Err(e) = store.complete_run(id, counts).await {
        tracing::warn!(run_id = id, error = %e, "could not complete collection run record");
    }
}

async fn fail_run(store: &dyn TrendStore, run_id: Option<i64>, message: &str) {
    let Some(id) = run_id else { return };
    if let Err(e) = store.fail_run(id, message).await {
        tracing::warn!(run_id = id, error = %e, "could not fail collection run record");
    }
}

#[cfg(test)]
#[path = "cycle_test.rs"]
mod tests;
