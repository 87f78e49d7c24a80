//! The three telemetry stores and the operations that span them

pub mod agent;
pub mod diagnostics;
pub mod hooks;

use serde::Serialize;

use crate::error::QueryError;
use crate::event_log::{RetentionConfig, StoredEvent};
use crate::types::{AgentEvent, DiagnosticEvent, HookEvent, LogStats, MetricsSnapshot};
use crate::utils::{system_clock, SharedClock};

pub use agent::AgentEventLog;
pub use diagnostics::DiagnosticEventLog;
pub use hooks::HookEventLog;

/// Events of one session across all stores
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvents {
    pub session_key: String,
    pub agent: Vec<StoredEvent<AgentEvent>>,
    pub diagnostics: Vec<StoredEvent<DiagnosticEvent>>,
    pub hooks: Vec<StoredEvent<HookEvent>>,
}

impl SessionEvents {
    pub fn is_empty(&self) -> bool {
        self.agent.is_empty() && self.diagnostics.is_empty() && self.hooks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.agent.len() + self.diagnostics.len() + self.hooks.len()
    }
}

/// `stats()` of every store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub agent: LogStats,
    pub diagnostics: LogStats,
    pub hooks: LogStats,
}

/// Agent, diagnostic and hook logs sharing one clock
pub struct TelemetryStores {
    agent: AgentEventLog,
    diagnostics: DiagnosticEventLog,
    hooks: HookEventLog,
    clock: SharedClock,
}

impl TelemetryStores {
    pub fn new(config: RetentionConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    pub fn with_clock(config: RetentionConfig, clock: SharedClock) -> Self {
        Self {
            agent: AgentEventLog::with_clock(config.clone(), clock.clone()),
            diagnostics: DiagnosticEventLog::with_clock(config.clone(), clock.clone()),
            hooks: HookEventLog::with_clock(config, clock.clone()),
            clock,
        }
    }

    pub fn agent(&self) -> &AgentEventLog {
        &self.agent
    }

    pub fn diagnostics(&self) -> &DiagnosticEventLog {
        &self.diagnostics
    }

    pub fn hooks(&self) -> &HookEventLog {
        &self.hooks
    }

    /// Session-ended signal: mark the session completed in every store
    pub fn mark_session_completed(&self, session_key: &str) {
        self.agent.mark_session_completed(session_key);
        self.diagnostics.mark_session_completed(session_key);
        self.hooks.mark_session_completed(session_key);
    }

    /// Most recent `limit` events per store for one session
    pub fn session_events(
        &self,
        session_key: Option<&str>,
        limit: Option<usize>,
    ) -> Result<SessionEvents, QueryError> {
        let session_key = non_blank(session_key).ok_or(QueryError::MissingSessionKey)?;

        Ok(SessionEvents {
            session_key: session_key.to_string(),
            agent: self.agent.by_session(session_key, limit),
            diagnostics: self.diagnostics.by_session(session_key, limit),
            hooks: self.hooks.by_session(session_key, limit),
        })
    }

    /// Most recent `limit` agent events of one run
    pub fn run_events(
        &self,
        run_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<StoredEvent<AgentEvent>>, QueryError> {
        let run_id = non_blank(run_id).ok_or(QueryError::MissingRunId)?;
        Ok(self.agent.by_run(run_id, limit))
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            agent: self.agent.stats(),
            diagnostics: self.diagnostics.stats(),
            hooks: self.hooks.stats(),
        }
    }

    /// Aggregate all three stores into one metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: self.clock.now_millis(),
            agent: agent::summarize(&self.agent),
            diagnostics: diagnostics::summarize(&self.diagnostics),
            hooks: hooks::summarize(&self.hooks),
        }
    }

    pub fn clear(&self) {
        self.agent.clear();
        self.diagnostics.clear();
        self.hooks.clear();
    }
}

impl Default for TelemetryStores {
    fn default() -> Self {
        Self::new(RetentionConfig::default())
    }
}

fn non_blank(key: Option<&str>) -> Option<&str> {
    key.filter(|key| !key.trim().is_empty())
}
