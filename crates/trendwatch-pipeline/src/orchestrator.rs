//! Fan-out of one collection run over every active source.

use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;
use serde::Serialize;
use trendwatch_collectors::SourceCollector;
use trendwatch_core::{Keyword, Source};

use crate::error::{PipelineError, StoreError};
use crate::store::TrendStore;

/// Aggregate result of one collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub successful: usize,
    pub failed: usize,
    pub items_written: usize,
}

/// How one source task ended.
#[derive(Debug)]
enum SourceResult {
    Succeeded { written: usize },
    UnknownType,
    StoreFailed(StoreError),
    Panicked(String),
}

/// Collect every active keyword from every active source.
///
/// Sources run concurrently; keywords within a source run one after another.
/// A failing source, including one whose adapter panics, is counted and
/// never cancels its siblings.
///
/// # Errors
///
/// Returns [`PipelineError::ConfigFetch`] when the active keywords or sources
/// cannot be loaded. Nothing is collected in that case.
pub async fn run_collection(
    store: &dyn TrendStore,
    collector: &dyn SourceCollector,
) -> Result<CollectionSummary, PipelineError> {
    let keywords = store
        .active_keywords()
        .await
        .map_err(PipelineError::ConfigFetch)?;
    let sources = store
        .active_sources()
        .await
        .map_err(PipelineError::ConfigFetch)?;

    tracing::info!(
        sources = sources.len(),
        keywords = keywords.len(),
        "collection run starting"
    );

    let tasks = sources.iter().map(|source| {
        AssertUnwindSafe(collect_source(store, collector, source, &keywords))
            .catch_unwind()
            .map(settle)
    });
    let results = join_all(tasks).await;

    let mut summary = CollectionSummary::default();
    for (source, result) in sources.iter().zip(results) {
        match result {
            SourceResult::Succeeded { written } => {
                summary.successful += 1;
                summary.items_written += written;
            }
            SourceResult::UnknownType => {
                summary.failed += 1;
                tracing::warn!(
                    source = %source.name,
                    source_type = %source.source_type,
                    "unknown source type; source skipped"
                );
            }
            SourceResult::StoreFailed(e) => {
                summary.failed += 1;
                tracing::error!(source = %source.name, error = %e, "source task failed");
            }
            SourceResult::Panicked(message) => {
                summary.failed += 1;
                tracing::error!(source = %source.name, panic = %message, "source task panicked");
            }
        }
    }

    tracing::info!(
        successful = summary.successful,
        failed = summary.failed,
        items_written = summary.items_written,
        "collection run finished"
    );
    Ok(summary)
}

async fn collect_source(
    store: &dyn TrendStore,
    collector: &dyn SourceCollector,
    source: &Source,
    keywords: &[Keyword],
) -> SourceResult {
    let Some(kind) = source.kind() else {
        return SourceResult::UnknownType;
    };

    let mut written = 0;
    for keyword in keywords {
        // Failed outcomes were logged by the adapter and yield no items.
        let items = collector.collect(kind, source, keyword).await.into_items();
        if items.is_empty() {
            continue;
        }
        match store.write_items(&items).await {
            Ok(n) => {
                written += n;
                tracing::debug!(
                    source = %source.name,
                    keyword = %keyword.name,
                    written = n,
                    "batch stored"
                );
            }
            Err(e) => return SourceResult::StoreFailed(e),
        }
    }

    tracing::debug!(source = %source.name, written, "source done");
    SourceResult::Succeeded { written }
}

fn settle(outcome: std::thread::Result<SourceResult>) -> SourceResult {
    outcome.unwrap_or_else(|panic| SourceResult::Panicked(panic_message(&*panic)))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
