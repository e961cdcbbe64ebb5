use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CollectionRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CollectionRunItem {
    collection_run_id: Uuid,
    trigger_source: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    successful_sources: i32,
    failed_sources: i32,
    items_written: i32,
    alerts_raised: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<trendwatch_db::CollectionRunRow> for CollectionRunItem {
    fn from(row: trendwatch_db::CollectionRunRow) -> Self {
        Self {
            collection_run_id: row.public_id,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            successful_sources: row.successful_sources,
            failed_sources: row.failed_sources,
            items_written: row.items_written,
            alerts_raised: row.alerts_raised,
            error_message: row.error_message,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_collection_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CollectionRunsQuery>,
) -> Result<Json<ApiResponse<Vec<CollectionRunItem>>>, ApiError> {
    let rows = trendwatch_db::list_collection_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(CollectionRunItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::CollectionRunItem;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn collection_run_item_is_serializable() {
        let row = trendwatch_db::CollectionRunRow {
            id: 7,
            public_id: Uuid::new_v4(),
            trigger_source: "scheduler".to_string(),
            status: "succeeded".to_string(),
            started_at: Some(Utc::now()),
            completed_at: Some(Utc::now()),
            successful_sources: 9,
            failed_sources: 1,
            items_written: 41,
            alerts_raised: 2,
            error_message: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&CollectionRunItem::from(row)).expect("serialize run");
        assert!(json.contains("\"trigger_source\":\"scheduler\""));
        assert!(json.contains("\"items_written\":41"));
        assert!(!json.contains("\"id\":7"), "internal id is not exposed");
    }
}
