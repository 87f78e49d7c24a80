//! Event ingestion and filtered queries

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::ApiResponse;
use crate::api::state::AppState;
use crate::event_log::{EventLog, EventQuery, LogRecord, StoredEvent};
use crate::types::{AgentEvent, DiagnosticEvent, HookEvent};

/// Response for an accepted event
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingested {
    pub id: u64,
    pub event_id: String,
}

fn ingest<E: LogRecord>(log: &EventLog<E>, event: E) -> (StatusCode, Json<Ingested>) {
    let id = log.add(event);
    (
        StatusCode::CREATED,
        Json(Ingested {
            id,
            event_id: E::display_id(id),
        }),
    )
}

fn query<E: LogRecord>(
    log: &EventLog<E>,
    params: &EventQuery,
) -> Json<ApiResponse<Vec<StoredEvent<E>>>> {
    let events = log.query(params);
    let total = events.len();
    Json(ApiResponse::with_total(events, total))
}

/// POST /api/events/agent
pub async fn ingest_agent(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AgentEvent>,
) -> (StatusCode, Json<Ingested>) {
    ingest(state.stores.agent(), event)
}

/// POST /api/events/diagnostic
pub async fn ingest_diagnostic(
    State(state): State<Arc<AppState>>,
    Json(event): Json<DiagnosticEvent>,
) -> (StatusCode, Json<Ingested>) {
    ingest(state.stores.diagnostics(), event)
}

/// POST /api/events/hook
pub async fn ingest_hook(
    State(state): State<Arc<AppState>>,
    Json(event): Json<HookEvent>,
) -> (StatusCode, Json<Ingested>) {
    ingest(state.stores.hooks(), event)
}

/// GET /api/events/agent?stream=&sessionKey=&runId=&since=&limit=
pub async fn list_agent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQuery>,
) -> Json<ApiResponse<Vec<StoredEvent<AgentEvent>>>> {
    query(state.stores.agent(), &params)
}

/// GET /api/events/diagnostic?type=&sessionKey=&since=&limit=
pub async fn list_diagnostic(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQuery>,
) -> Json<ApiResponse<Vec<StoredEvent<DiagnosticEvent>>>> {
    query(state.stores.diagnostics(), &params)
}

/// GET /api/events/hook?hook=&sessionKey=&since=&limit=
pub async fn list_hook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventQuery>,
) -> Json<ApiResponse<Vec<StoredEvent<HookEvent>>>> {
    query(state.stores.hooks(), &params)
}
