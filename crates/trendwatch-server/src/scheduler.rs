//! Background job scheduler.
//!
//! Registers the recurring collect → analyze → notify cycle on a cron
//! schedule evaluated in the configured timezone.

use std::sync::Arc;

use chrono_tz::Tz;
use tokio_cron_scheduler::{Job, JobScheduler};
use trendwatch_collectors::SourceCollector;
use trendwatch_pipeline::{run_cycle, Notifier, TrendStore, Trigger};

use crate::api::TriggerResult;

/// Everything one scheduled cycle needs.
pub struct CycleDeps {
    pub store: Arc<dyn TrendStore>,
    pub collector: Arc<dyn SourceCollector>,
    pub notifier: Notifier,
}

/// Parse an IANA timezone name such as `Asia/Seoul`.
///
/// # Errors
///
/// Returns an error naming the value when it is not a known zone.
pub fn parse_timezone(name: &str) -> anyhow::Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("invalid TRENDWATCH_TIMEZONE '{name}': {e}"))
}

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns an error if the timezone or cron expression is invalid, or the
/// scheduler fails to start.
pub async fn build_scheduler(
    deps: Arc<CycleDeps>,
    cron: &str,
    timezone: &str,
) -> anyhow::Result<JobScheduler> {
    let tz = parse_timezone(timezone)?;
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async_tz(cron, tz, move |_uuid, _lock| {
        let deps = Arc::clone(&deps);
        Box::pin(async move {
            tracing::info!("scheduler: starting collection cycle");
            let result = scheduled_cycle(&deps).await;
            match serde_json::to_string(&result) {
                Ok(body) => tracing::info!(result = %body, "scheduler: collection cycle finished"),
                Err(e) => tracing::warn!(error = %e, "scheduler: could not encode cycle result"),
            }
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    tracing::info!(cron, timezone, "scheduler started");
    Ok(scheduler)
}

async fn scheduled_cycle(deps: &CycleDeps) -> TriggerResult {
    match run_cycle(
        deps.store.as_ref(),
        deps.collector.as_ref(),
        &deps.notifier,
        Trigger::Scheduler,
    )
    .await
    {
        Ok(report) => {
            if report.dispatch.failures > 0 {
                tracing::warn!(
                    failures = report.dispatch.failures,
                    "scheduler: some alert deliveries failed"
                );
            }
            TriggerResult::completed(&report.summary)
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: collection cycle failed");
            TriggerResult::failed(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use trendwatch_pipeline::MemoryStore;

    use super::*;

    struct Idle;

    #[async_trait::async_trait]
    impl SourceCollector for Idle {
        async fn collect(
            &self,
            _kind: trendwatch_core::SourceKind,
            _source: &trendwatch_core::Source,
            _keyword: &trendwatch_core::Keyword,
        ) -> trendwatch_collectors::AdapterOutcome {
            trendwatch_collectors::AdapterOutcome::Collected(Vec::new())
        }
    }

    fn deps(store: MemoryStore) -> CycleDeps {
        CycleDeps {
            store: Arc::new(store),
            collector: Arc::new(Idle),
            notifier: Notifier::new(Client::new()),
        }
    }

    #[test]
    fn seoul_timezone_parses_and_garbage_does_not() {
        assert_eq!(parse_timezone("Asia/Seoul").expect("tz"), Tz::Asia__Seoul);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[tokio::test]
    async fn scheduled_cycle_reports_config_failure() {
        let result = scheduled_cycle(&deps(MemoryStore::new().failing_config())).await;
        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(result.message.is_none());
    }

    #[tokio::test]
    async fn scheduled_cycle_reports_counts_without_message() {
        let result = scheduled_cycle(&deps(MemoryStore::new())).await;
        assert_eq!(
            serde_json::to_value(&result).expect("json"),
            serde_json::json!({ "success": true, "successful": 0, "failed": 0 })
        );
    }

    #[tokio::test]
    async fn invalid_cron_is_rejected() {
        let err = build_scheduler(Arc::new(deps(MemoryStore::new())), "every tuesday", "Asia/Seoul")
            .await
            .err();
        assert!(err.is_some());
    }
}
