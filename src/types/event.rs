//! Ingested telemetry event types
//!
//! These are the payloads the agent runtime emits. They are stored as-is
//! inside [`crate::event_log::StoredEvent`]; the store assigns ids and
//! creation timestamps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Agent lifecycle, tool and assistant output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEvent {
    /// Run this event belongs to
    pub run_id: String,

    /// Runtime-assigned sequence number within the run
    pub seq: u64,

    /// Stream name (lifecycle, tool, assistant, ...)
    pub stream: String,

    /// Runtime timestamp in Unix milliseconds
    pub timestamp: i64,

    /// Stream-specific payload
    #[serde(default)]
    pub data: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
}

impl AgentEvent {
    pub fn new(run_id: impl Into<String>, seq: u64, stream: impl Into<String>, data: Value) -> Self {
        Self {
            run_id: run_id.into(),
            seq,
            stream: stream.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            data,
            session_key: None,
        }
    }

    pub fn with_session(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }
}

/// Diagnostic event (heartbeats, channel health, errors)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticEvent {
    /// Diagnostic type, e.g. `heartbeat` or `channel.error`
    #[serde(rename = "type")]
    pub kind: String,

    /// Runtime timestamp in Unix milliseconds
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Remaining type-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DiagnosticEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            session_key: None,
            channel: None,
            fields: Map::new(),
        }
    }

    pub fn with_session(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// Lifecycle hook invocation
///
/// The runtime only guarantees a hook name plus opaque `context` and `event`
/// payloads. The session key is lifted out of those once, at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "HookEventPayload")]
pub struct HookEvent {
    pub hook_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,

    pub context: Value,

    pub event: Value,

    /// Value returned by the hook, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl HookEvent {
    /// Build a hook event, reading the session key from `context` or `event`
    pub fn new(hook_name: impl Into<String>, context: Value, event: Value) -> Self {
        HookEventPayload {
            hook_name: hook_name.into(),
            session_key: None,
            context,
            event,
            result: None,
        }
        .into()
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }
}

/// Wire shape of a hook event before the session key is resolved
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HookEventPayload {
    hook_name: String,
    #[serde(default)]
    session_key: Option<String>,
    #[serde(default)]
    context: Value,
    #[serde(default)]
    event: Value,
    #[serde(default)]
    result: Option<Value>,
}

impl From<HookEventPayload> for HookEvent {
    fn from(payload: HookEventPayload) -> Self {
        let session_key = payload
            .session_key
            .filter(|key| !key.is_empty())
            .or_else(|| session_key_in(&payload.context))
            .or_else(|| session_key_in(&payload.event));

        Self {
            hook_name: payload.hook_name,
            session_key,
            context: payload.context,
            event: payload.event,
            result: payload.result,
        }
    }
}

fn session_key_in(value: &Value) -> Option<String> {
    value
        .get("sessionKey")
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}
