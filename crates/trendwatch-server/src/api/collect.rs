use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use trendwatch_pipeline::{run_collection_audited, CollectionSummary, PipelineError, Trigger};

use super::AppState;

const MANUAL_MESSAGE: &str = "Manual collection completed";

/// Body returned by the manual trigger and logged by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TriggerResult {
    #[must_use]
    pub fn completed(summary: &CollectionSummary) -> Self {
        Self {
            success: true,
            message: None,
            successful: Some(summary.successful),
            failed: Some(summary.failed),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: &PipelineError) -> Self {
        Self {
            success: false,
            message: None,
            successful: None,
            failed: None,
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

/// Run one collection now and report the per-source counts.
pub(super) async fn manual_collect(State(state): State<AppState>) -> Response {
    tracing::info!("manual collection requested");
    match run_collection_audited(state.store.as_ref(), state.collector.as_ref(), Trigger::Manual)
        .await
    {
        Ok(summary) => (
            StatusCode::OK,
            Json(TriggerResult::completed(&summary).with_message(MANUAL_MESSAGE)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "manual collection failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TriggerResult::failed(&e)),
            )
                .into_response()
        }
    }
}

pub(super) async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}
