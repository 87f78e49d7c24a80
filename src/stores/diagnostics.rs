//! Diagnostic event store: indexed by diagnostic type and session key
//!
//! Heartbeats are diagnostics of type `heartbeat` (or `heartbeat.*`). A
//! heartbeat succeeded when its `success` field is `true`; without a
//! `success` field it succeeded unless it carries an `error`.

use serde_json::Value;

use crate::event_log::{EventLog, LogRecord, StoredEvent};
use crate::types::{DiagnosticEvent, DiagnosticMetrics, HeartbeatMetrics};

pub type DiagnosticEventLog = EventLog<DiagnosticEvent>;

pub const HEARTBEAT_TYPE: &str = "heartbeat";

impl LogRecord for DiagnosticEvent {
    const KIND: &'static str = "diagnostic";
    const ID_PREFIX: &'static str = "diag";

    fn classification_key(&self) -> &str {
        &self.kind
    }

    fn session_key(&self) -> Option<&str> {
        self.session_key.as_deref()
    }
}

pub fn is_heartbeat(event: &DiagnosticEvent) -> bool {
    event.kind == HEARTBEAT_TYPE
        || event
            .kind
            .strip_prefix(HEARTBEAT_TYPE)
            .is_some_and(|rest| rest.starts_with('.'))
}

pub fn heartbeat_succeeded(event: &DiagnosticEvent) -> bool {
    match event.fields.get("success").and_then(Value::as_bool) {
        Some(success) => success,
        None => event.fields.get("error").map_or(true, Value::is_null),
    }
}

/// Heartbeat health over retained events, oldest first
pub fn heartbeat_metrics(events: &[StoredEvent<DiagnosticEvent>]) -> HeartbeatMetrics {
    let outcomes: Vec<(i64, bool)> = events
        .iter()
        .filter(|stored| is_heartbeat(&stored.event))
        .map(|stored| (stored.timestamp, heartbeat_succeeded(&stored.event)))
        .collect();

    let total = outcomes.len();
    let successes = outcomes.iter().filter(|(_, ok)| *ok).count();
    let consecutive_failures = outcomes.iter().rev().take_while(|(_, ok)| !*ok).count();

    HeartbeatMetrics {
        total,
        successes,
        failures: total - successes,
        success_rate: (total > 0).then(|| successes as f64 / total as f64),
        consecutive_failures,
        last_heartbeat: outcomes.last().map(|(timestamp, _)| *timestamp),
    }
}

pub fn summarize(log: &DiagnosticEventLog) -> DiagnosticMetrics {
    log.summarize_with(|view| DiagnosticMetrics {
        total_events: view.stats.total_events,
        events_by_type: view.stats.events_by_key,
        heartbeat: heartbeat_metrics(view.events),
    })
}
