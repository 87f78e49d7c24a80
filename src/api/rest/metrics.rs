//! Store statistics and aggregated metrics

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use super::{ApiError, ApiResponse, ApiResult, LimitParams};
use crate::api::state::AppState;
use crate::stores::StoreStats;
use crate::types::MetricsSnapshot;

/// GET /api/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StoreStats>> {
    Json(ApiResponse::new(state.stores.stats()))
}

/// GET /api/metrics/latest
pub async fn latest_metrics(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<MetricsSnapshot>>> {
    state
        .aggregator
        .latest_metrics()
        .map(|snapshot| Json(ApiResponse::new(snapshot)))
        .ok_or_else(|| ApiError::not_found("No metrics aggregated yet"))
}

/// GET /api/metrics/history?limit=
pub async fn metrics_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Json<ApiResponse<Vec<MetricsSnapshot>>> {
    let history = state.aggregator.metrics_history(params.limit);
    let total = history.len();
    Json(ApiResponse::with_total(history, total))
}
