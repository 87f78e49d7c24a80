//! Event Log - bounded, multi-index, append-ordered store
//!
//! One generic implementation backs the agent, diagnostic and hook stores.
//! Every `add` runs a retention pass under the same write lock, so readers
//! never observe a half-applied pass.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::debug;

use crate::types::LogStats;
use crate::utils::{duration_millis, system_clock, SharedClock};

use super::query::{most_recent, EventQuery};
use super::record::{LogRecord, StoredEvent};
use super::retention;
use super::sessions::{SessionState, SessionTracker};

/// Retention limits for one event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionConfig {
    /// Upper bound on retained events (exceeded only by active sessions)
    pub max_events: usize,
    /// Age ceiling for events outside any active or completed session
    pub max_age: Duration,
    /// Age ceiling for events of completed sessions, and for their tracking
    pub session_max_age: Duration,
    /// How recently a session must have been seen to count as active
    pub active_window: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_events: 10_000,
            max_age: Duration::from_secs(24 * 60 * 60),
            session_max_age: Duration::from_secs(7 * 24 * 60 * 60),
            active_window: Duration::from_secs(60 * 60),
        }
    }
}

impl RetentionConfig {
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_session_max_age(mut self, session_max_age: Duration) -> Self {
        self.session_max_age = session_max_age;
        self
    }
}

/// Everything guarded by the log's lock
pub(super) struct LogState<E> {
    pub(super) next_id: u64,
    pub(super) events: Vec<StoredEvent<E>>,
    pub(super) by_key: HashMap<String, Vec<usize>>,
    pub(super) by_session: HashMap<String, Vec<usize>>,
    pub(super) by_run: HashMap<String, Vec<usize>>,
    pub(super) sessions: SessionTracker,
}

impl<E: LogRecord> LogState<E> {
    fn new(active_window_ms: i64) -> Self {
        Self {
            next_id: 1,
            events: Vec::new(),
            by_key: HashMap::new(),
            by_session: HashMap::new(),
            by_run: HashMap::new(),
            sessions: SessionTracker::new(active_window_ms),
        }
    }

    fn index_event(&mut self, position: usize) {
        let stored = &self.events[position];
        self.by_key
            .entry(stored.classification_key().to_string())
            .or_default()
            .push(position);
        if let Some(session) = stored.session_key() {
            self.by_session
                .entry(session.to_string())
                .or_default()
                .push(position);
        }
        if let Some(run) = stored.run_id() {
            self.by_run.entry(run.to_string()).or_default().push(position);
        }
    }

    /// Throw away every index and rebuild from the primary log
    pub(super) fn rebuild_indices(&mut self) {
        self.by_key.clear();
        self.by_session.clear();
        self.by_run.clear();
        for position in 0..self.events.len() {
            self.index_event(position);
        }
    }

    fn stats(&self, now: i64) -> LogStats {
        LogStats {
            total_events: self.events.len(),
            events_by_key: self
                .by_key
                .iter()
                .map(|(key, positions)| (key.clone(), positions.len()))
                .collect(),
            unique_sessions: self.by_session.len(),
            active_sessions: self.sessions.active_count(now),
            oldest_timestamp: self.events.first().map(|e| e.timestamp),
            newest_timestamp: self.events.last().map(|e| e.timestamp),
        }
    }

    fn collect(&self, positions: &[usize], limit: Option<usize>) -> Vec<StoredEvent<E>> {
        let start = limit.map_or(0, |limit| positions.len().saturating_sub(limit));
        positions[start..]
            .iter()
            .map(|&position| self.events[position].clone())
            .collect()
    }
}

/// Everything a summary needs, read under a single lock acquisition
pub(crate) struct LogView<'a, E> {
    pub(crate) stats: LogStats,
    pub(crate) unique_runs: usize,
    pub(crate) events: &'a [StoredEvent<E>],
}

/// Bounded event log for one event kind
pub struct EventLog<E: LogRecord> {
    config: RetentionConfig,
    clock: SharedClock,
    state: RwLock<LogState<E>>,
}

impl<E: LogRecord> EventLog<E> {
    /// Create a log with default retention and the system clock
    pub fn new() -> Self {
        Self::with_config(RetentionConfig::default())
    }

    pub fn with_config(config: RetentionConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    pub fn with_clock(config: RetentionConfig, clock: SharedClock) -> Self {
        let active_window_ms = duration_millis(config.active_window);
        Self {
            config,
            clock,
            state: RwLock::new(LogState::new(active_window_ms)),
        }
    }

    pub fn config(&self) -> &RetentionConfig {
        &self.config
    }

    /// Append an event and run retention. Returns the assigned id.
    pub fn add(&self, event: E) -> u64 {
        let now = self.clock.now_millis();
        let mut state = self.state.write();

        let id = state.next_id;
        state.next_id += 1;

        if let Some(session) = event.session_key() {
            state.sessions.touch(session, now);
        }

        state.events.push(StoredEvent {
            id,
            timestamp: now,
            event,
        });
        let position = state.events.len() - 1;
        state.index_event(position);

        let report = retention::apply(&mut state, &self.config, now);
        if report.changed() {
            debug!(
                kind = E::KIND,
                evicted_by_age = report.evicted_by_age,
                evicted_by_cap = report.evicted_by_cap,
                sessions_collected = report.sessions_collected,
                retained = state.events.len(),
                "Retention pass"
            );
        }

        id
    }

    /// Filtered read; see [`EventQuery`]
    pub fn query(&self, query: &EventQuery) -> Vec<StoredEvent<E>> {
        let state = self.state.read();

        // Narrow through the most selective index available
        let candidates: Vec<&StoredEvent<E>> = if let Some(session) = &query.session_key {
            Self::indexed(&state, &state.by_session, session)
        } else if let (true, Some(run)) = (E::HAS_RUN_ID, &query.run_id) {
            Self::indexed(&state, &state.by_run, run)
        } else if let Some(key) = &query.key {
            Self::indexed(&state, &state.by_key, key)
        } else {
            state.events.iter().collect()
        };

        let matching: Vec<StoredEvent<E>> = candidates
            .into_iter()
            .filter(|stored| query.matches(stored))
            .cloned()
            .collect();

        most_recent(matching, query.limit)
    }

    fn indexed<'a>(
        state: &'a LogState<E>,
        index: &HashMap<String, Vec<usize>>,
        key: &str,
    ) -> Vec<&'a StoredEvent<E>> {
        index
            .get(key)
            .map(|positions| positions.iter().map(|&p| &state.events[p]).collect())
            .unwrap_or_default()
    }

    /// Most recent `limit` events of the whole log
    pub fn recent(&self, limit: Option<usize>) -> Vec<StoredEvent<E>> {
        let state = self.state.read();
        let start = limit.map_or(0, |limit| state.events.len().saturating_sub(limit));
        state.events[start..].to_vec()
    }

    /// Most recent `limit` events with the given classification key
    pub fn by_key(&self, key: &str, limit: Option<usize>) -> Vec<StoredEvent<E>> {
        let state = self.state.read();
        state
            .by_key
            .get(key)
            .map(|positions| state.collect(positions, limit))
            .unwrap_or_default()
    }

    pub fn by_session(&self, session_key: &str, limit: Option<usize>) -> Vec<StoredEvent<E>> {
        let state = self.state.read();
        state
            .by_session
            .get(session_key)
            .map(|positions| state.collect(positions, limit))
            .unwrap_or_default()
    }

    /// Always empty for kinds without run ids
    pub fn by_run(&self, run_id: &str, limit: Option<usize>) -> Vec<StoredEvent<E>> {
        let state = self.state.read();
        state
            .by_run
            .get(run_id)
            .map(|positions| state.collect(positions, limit))
            .unwrap_or_default()
    }

    /// Mark a session completed. Idempotent; returns `true` on first call.
    pub fn mark_session_completed(&self, session_key: &str) -> bool {
        let now = self.clock.now_millis();
        self.state.write().sessions.mark_completed(session_key, now)
    }

    pub fn session_state(&self, session_key: &str) -> SessionState {
        let now = self.clock.now_millis();
        self.state.read().sessions.state(session_key, now)
    }

    /// Drop all events and indices. Session tracking and ids carry on.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.events.clear();
        state.by_key.clear();
        state.by_session.clear();
        state.by_run.clear();
    }

    pub fn len(&self) -> usize {
        self.state.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> LogStats {
        let now = self.clock.now_millis();
        self.state.read().stats(now)
    }

    /// Distinct run ids among retained events
    pub fn unique_runs(&self) -> usize {
        self.state.read().by_run.len()
    }

    /// Run `f` over one consistent view of the log
    pub(crate) fn summarize_with<R>(&self, f: impl FnOnce(LogView<'_, E>) -> R) -> R {
        let now = self.clock.now_millis();
        let state = self.state.read();
        f(LogView {
            stats: state.stats(now),
            unique_runs: state.by_run.len(),
            events: &state.events,
        })
    }

    #[cfg(test)]
    pub(crate) fn distinct_sessions(&self) -> std::collections::HashSet<String> {
        self.state.read().by_session.keys().cloned().collect()
    }
}

impl<E: LogRecord> Default for EventLog<E> {
    fn default() -> Self {
        Self::new()
    }
}
