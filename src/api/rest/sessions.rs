//! Session and run scoped endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{ApiResponse, ApiResult};
use crate::api::state::AppState;
use crate::event_log::StoredEvent;
use crate::stores::SessionEvents;
use crate::types::AgentEvent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    #[serde(default)]
    pub session_key: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunParams {
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// GET /api/sessions/events?sessionKey=&limit=
pub async fn session_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionParams>,
) -> ApiResult<Json<ApiResponse<SessionEvents>>> {
    let events = state
        .stores
        .session_events(params.session_key.as_deref(), params.limit)?;
    let total = events.len();
    Ok(Json(ApiResponse::with_total(events, total)))
}

/// POST /api/sessions/:key/complete
pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    Path(session_key): Path<String>,
) -> StatusCode {
    state.stores.mark_session_completed(&session_key);
    StatusCode::NO_CONTENT
}

/// GET /api/runs/events?runId=&limit=
pub async fn run_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RunParams>,
) -> ApiResult<Json<ApiResponse<Vec<StoredEvent<AgentEvent>>>>> {
    let events = state
        .stores
        .run_events(params.run_id.as_deref(), params.limit)?;
    let total = events.len();
    Ok(Json(ApiResponse::with_total(events, total)))
}
