//! Agent event store: indexed by stream, run id and session key

use crate::event_log::{EventLog, LogRecord};
use crate::types::{AgentEvent, AgentMetrics};

pub type AgentEventLog = EventLog<AgentEvent>;

impl LogRecord for AgentEvent {
    const KIND: &'static str = "agent";
    const ID_PREFIX: &'static str = "evt";
    const HAS_RUN_ID: bool = true;

    fn classification_key(&self) -> &str {
        &self.stream
    }

    fn session_key(&self) -> Option<&str> {
        self.session_key.as_deref()
    }

    fn run_id(&self) -> Option<&str> {
        Some(self.run_id.as_str())
    }
}

/// Per-stream counts plus run and session cardinality
pub fn summarize(log: &AgentEventLog) -> AgentMetrics {
    log.summarize_with(|view| AgentMetrics {
        total_events: view.stats.total_events,
        events_by_stream: view.stats.events_by_key,
        unique_runs: view.unique_runs,
        unique_sessions: view.stats.unique_sessions,
        active_sessions: view.stats.active_sessions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::EventQuery;
    use serde_json::json;

    #[test]
    fn test_agent_summary() {
        let log = AgentEventLog::new();
        log.add(AgentEvent::new("r1", 1, "lifecycle", json!({"phase": "start"})).with_session("s1"));
        log.add(AgentEvent::new("r1", 2, "tool", json!({"name": "bash"})).with_session("s1"));
        log.add(AgentEvent::new("r2", 1, "tool", json!({"name": "read"})));

        let metrics = summarize(&log);
        assert_eq!(metrics.total_events, 3);
        assert_eq!(metrics.events_by_stream.get("tool"), Some(&2));
        assert_eq!(metrics.unique_runs, 2);
        assert_eq!(metrics.unique_sessions, 1);
        assert_eq!(metrics.active_sessions, 1);
    }

    #[test]
    fn test_query_by_run_and_stream() {
        let log = AgentEventLog::new();
        log.add(AgentEvent::new("r1", 1, "tool", json!({})));
        log.add(AgentEvent::new("r1", 2, "assistant", json!({"text": "hi"})));
        log.add(AgentEvent::new("r2", 1, "tool", json!({})));

        let found = log.query(&EventQuery::new().run("r1").key("tool"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].event.seq, 1);
        assert!(found[0].display_id().starts_with("evt-"));
    }
}
