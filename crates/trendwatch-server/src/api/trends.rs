use axum::{extract::State, Extension, Json};
use chrono::Utc;
use trendwatch_pipeline::{analyze_trends, TrendReport};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Both windows as of now, with the alerts they would raise. Sends nothing.
pub(super) async fn current_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TrendReport>>, ApiError> {
    let report = analyze_trends(state.store.as_ref(), Utc::now())
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}
