//! Integration tests for the telemetry stores, aggregator and HTTP API

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use agent_telemetry::api::{create_router, AppState};
use agent_telemetry::metrics::{MetricsPersistence, METRICS_FILE_NAME};
use agent_telemetry::types::{AgentEvent, DiagnosticEvent, HookEvent};
use agent_telemetry::utils::ManualClock;
use agent_telemetry::{
    AggregatorConfig, AggregatorState, EventQuery, MetricsAggregator, QueryError,
    RetentionConfig, TelemetryStores,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

const START: i64 = 1_700_000_000_000;

fn setup_stores() -> (Arc<TelemetryStores>, ManualClock) {
    let clock = ManualClock::new(START);
    let stores = Arc::new(TelemetryStores::with_clock(
        RetentionConfig::default(),
        clock.shared(),
    ));
    (stores, clock)
}

fn aggregator_config(dir: &TempDir) -> AggregatorConfig {
    AggregatorConfig {
        interval: Duration::from_secs(3600),
        max_history: 10,
        state_path: Some(dir.path().join(METRICS_FILE_NAME)),
        ..AggregatorConfig::default()
    }
}

// ============================================================================
// Stores
// ============================================================================

#[test]
fn test_concurrent_adds_get_unique_ids() {
    let (stores, _clock) = setup_stores();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let stores = stores.clone();
            thread::spawn(move || {
                (0..100)
                    .map(|i| {
                        let event = AgentEvent::new(format!("run-{}", t), i, "tool", json!({}))
                            .with_session(format!("session-{}", t));
                        stores.agent().add(event)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: Vec<u64> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    let unique: HashSet<u64> = ids.iter().copied().collect();

    assert_eq!(ids.len(), 800);
    assert_eq!(unique.len(), 800);
    assert_eq!(stores.agent().len(), 800);
    assert_eq!(stores.agent().by_run("run-3", None).len(), 100);
}

#[test]
fn test_snapshots_consistent_during_concurrent_adds() {
    let (stores, _clock) = setup_stores();

    let writer = {
        let stores = stores.clone();
        thread::spawn(move || {
            for i in 0..2_000 {
                stores
                    .agent()
                    .add(AgentEvent::new(format!("run-{}", i), 0, "tool", json!({})));
                stores.diagnostics().add(DiagnosticEvent::new("heartbeat"));
            }
        })
    };

    for _ in 0..200 {
        let snapshot = stores.snapshot();
        assert_eq!(snapshot.agent.unique_runs, snapshot.agent.total_events);
        assert_eq!(
            snapshot.diagnostics.heartbeat.total,
            snapshot.diagnostics.total_events
        );
    }
    writer.join().unwrap();

    let snapshot = stores.snapshot();
    assert_eq!(snapshot.agent.unique_runs, 2_000);
    assert_eq!(snapshot.diagnostics.heartbeat.total, 2_000);
}

#[test]
fn test_session_and_run_queries() {
    let (stores, clock) = setup_stores();

    for seq in 0..5 {
        stores
            .agent()
            .add(AgentEvent::new("run-a", seq, "assistant", json!({})).with_session("s1"));
        clock.advance(Duration::from_secs(1));
    }
    stores
        .diagnostics()
        .add(DiagnosticEvent::new("heartbeat").with_session("s1"));
    stores.hooks().add(HookEvent::new(
        "before_agent_start",
        json!({"sessionKey": "s1"}),
        json!({}),
    ));
    stores
        .agent()
        .add(AgentEvent::new("run-b", 0, "lifecycle", json!({})).with_session("s2"));

    let session = stores.session_events(Some("s1"), Some(3)).unwrap();
    assert_eq!(session.agent.len(), 3);
    assert_eq!(session.agent[2].event.seq, 4);
    assert_eq!(session.diagnostics.len(), 1);
    assert_eq!(session.hooks.len(), 1);

    assert_eq!(stores.run_events(Some("run-a"), None).unwrap().len(), 5);
    assert!(stores.run_events(Some("run-z"), None).unwrap().is_empty());

    assert_eq!(
        stores.session_events(None, None),
        Err(QueryError::MissingSessionKey)
    );
    assert_eq!(
        stores.run_events(Some("  "), None),
        Err(QueryError::MissingRunId)
    );
}

#[test]
fn test_query_filters_combine() {
    let (stores, clock) = setup_stores();

    stores
        .agent()
        .add(AgentEvent::new("run-1", 0, "tool", json!({})).with_session("s1"));
    clock.advance(Duration::from_secs(10));
    let since = START + 10_000;
    stores
        .agent()
        .add(AgentEvent::new("run-1", 1, "tool", json!({})).with_session("s1"));
    stores
        .agent()
        .add(AgentEvent::new("run-1", 2, "assistant", json!({})).with_session("s1"));
    stores
        .agent()
        .add(AgentEvent::new("run-2", 0, "tool", json!({})).with_session("s1"));

    let query = EventQuery::new()
        .key("tool")
        .session("s1")
        .run("run-1")
        .since(since);
    let events = stores.agent().query(&query);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.seq, 1);
}

// ============================================================================
// Aggregator
// ============================================================================

#[tokio::test]
async fn test_history_survives_restart() {
    let dir = TempDir::new().unwrap();
    let (stores, clock) = setup_stores();

    let first = Arc::new(MetricsAggregator::with_clock(
        stores.clone(),
        aggregator_config(&dir),
        clock.shared(),
    ));
    first.start().await;
    stores
        .agent()
        .add(AgentEvent::new("run-1", 0, "tool", json!({})));
    clock.advance(Duration::from_secs(60));
    first.aggregate_now();
    first.stop().await;
    assert_eq!(first.state(), AggregatorState::Stopped);

    let saved = MetricsPersistence::in_state_dir(dir.path()).load().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1].agent.total_events, 1);

    let second = Arc::new(MetricsAggregator::with_clock(
        stores.clone(),
        aggregator_config(&dir),
        clock.shared(),
    ));
    second.start().await;

    // Two loaded snapshots plus the one taken on start
    let history = second.metrics_history(None);
    assert_eq!(history.len(), 3);
    assert_eq!(history[..2], saved[..]);

    second.stop().await;
}

#[tokio::test]
async fn test_restart_respects_smaller_history_bound() {
    let dir = TempDir::new().unwrap();
    let (stores, clock) = setup_stores();

    let first = Arc::new(MetricsAggregator::with_clock(
        stores.clone(),
        aggregator_config(&dir),
        clock.shared(),
    ));
    first.start().await;
    for _ in 0..5 {
        clock.advance(Duration::from_secs(60));
        first.aggregate_now();
    }
    first.stop().await;

    let config = AggregatorConfig {
        max_history: 3,
        ..aggregator_config(&dir)
    };
    let second = Arc::new(MetricsAggregator::with_clock(stores, config, clock.shared()));
    second.start().await;

    let history = second.metrics_history(None);
    assert_eq!(history.len(), 3);
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    second.stop().await;
}

// ============================================================================
// HTTP API
// ============================================================================

fn setup_app() -> (Router, Arc<TelemetryStores>, Arc<MetricsAggregator>) {
    let (stores, clock) = setup_stores();
    let aggregator = Arc::new(MetricsAggregator::with_clock(
        stores.clone(),
        AggregatorConfig::default(),
        clock.shared(),
    ));
    let state = Arc::new(AppState::new(stores.clone(), aggregator.clone()));
    (create_router(state), stores, aggregator)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_api_ingest_and_query() {
    let (app, stores, _aggregator) = setup_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/events/agent",
            json!({
                "runId": "run-1",
                "seq": 1,
                "stream": "tool",
                "timestamp": START,
                "data": {},
                "sessionKey": "s1"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert_eq!(body["eventId"], "evt-1");
    assert_eq!(body["eventId"], stores.agent().recent(None)[0].display_id());

    let (status, body) = send(
        &app,
        post_json(
            "/api/events/hook",
            json!({"hookName": "message_received", "context": {}, "event": {"sessionKey": "s1"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["eventId"], "hook-1");
    assert_eq!(stores.hooks().by_session("s1", None).len(), 1);

    let (status, body) = send(&app, get("/api/events/agent?stream=tool&sessionKey=s1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["event"]["runId"], "run-1");

    let (_, body) = send(&app, get("/api/events/agent?stream=assistant")).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_api_session_endpoints() {
    let (app, stores, _aggregator) = setup_app();
    stores.diagnostics().add(
        DiagnosticEvent::new("heartbeat")
            .with_session("s1")
            .with_field("success", json!(true)),
    );

    let (status, body) = send(&app, get("/api/sessions/events")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, get("/api/sessions/events?sessionKey=s1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["diagnostics"][0]["event"]["type"], "heartbeat");

    let (status, _) = send(&app, post_json("/api/sessions/s1/complete", json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        stores.diagnostics().session_state("s1"),
        agent_telemetry::SessionState::Completed
    );

    let (status, _) = send(&app, get("/api/runs/events")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_metrics() {
    let (app, _stores, aggregator) = setup_app();

    let (status, _) = send(&app, get("/api/metrics/latest")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(
        &app,
        post_json(
            "/api/events/diagnostic",
            json!({"type": "heartbeat", "timestamp": START, "error": "timeout"}),
        ),
    )
    .await;
    assert_eq!(body["eventId"], "diag-1");

    aggregator.aggregate_now();
    aggregator.aggregate_now();

    let (status, body) = send(&app, get("/api/metrics/latest")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["diagnostics"]["heartbeat"]["failures"], 1);
    assert_eq!(body["data"]["diagnostics"]["heartbeat"]["consecutiveFailures"], 1);

    let (_, body) = send(&app, get("/api/metrics/history?limit=1")).await;
    assert_eq!(body["total"], 1);

    let (status, body) = send(&app, get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["diagnostics"]["totalEvents"], 1);
}
