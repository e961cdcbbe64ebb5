use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use trendwatch_core::Item;

use crate::middleware::RequestId;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ItemsQuery {
    pub keyword: Option<String>,
    pub limit: Option<i64>,
}

/// Most recently stored items, newest first.
pub(super) async fn list_items(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<ApiResponse<Vec<Item>>>, ApiError> {
    let keyword = query
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let data = state
        .store
        .recent_items(keyword, normalize_limit(query.limit))
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
