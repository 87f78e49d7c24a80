//! Retention pass
//!
//! Runs after every insert, under the log's write lock:
//!
//! 1. Age filter: active-session events always survive; events of completed
//!    sessions survive up to the session age ceiling; everything else up to
//!    the standard age ceiling.
//! 2. Count cap: active-session events are kept in full, the remaining
//!    budget goes to the most recent other events.
//! 3. Every index is rebuilt from the surviving log.
//! 4. Completed sessions idle past the session age ceiling are forgotten.

use crate::utils::duration_millis;

use super::record::{LogRecord, StoredEvent};
use super::sessions::SessionTracker;
use super::store::{LogState, RetentionConfig};

/// What one pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct RetentionReport {
    pub(super) evicted_by_age: usize,
    pub(super) evicted_by_cap: usize,
    pub(super) sessions_collected: usize,
}

impl RetentionReport {
    pub(super) fn changed(&self) -> bool {
        self.evicted_by_age + self.evicted_by_cap + self.sessions_collected > 0
    }
}

fn in_active_session<E: LogRecord>(
    stored: &StoredEvent<E>,
    sessions: &SessionTracker,
    now: i64,
) -> bool {
    stored
        .session_key()
        .is_some_and(|session| sessions.is_active(session, now))
}

fn within_age_limit<E: LogRecord>(
    stored: &StoredEvent<E>,
    sessions: &SessionTracker,
    now: i64,
    max_age_ms: i64,
    session_max_age_ms: i64,
) -> bool {
    match stored.session_key() {
        Some(session) if sessions.is_active(session, now) => true,
        Some(session) if sessions.is_completed(session) => {
            stored.age_at(now) <= session_max_age_ms
        }
        _ => stored.age_at(now) <= max_age_ms,
    }
}

fn is_chronological<E>(events: &[StoredEvent<E>]) -> bool {
    events
        .windows(2)
        .all(|pair| (pair[0].timestamp, pair[0].id) <= (pair[1].timestamp, pair[1].id))
}

pub(super) fn apply<E: LogRecord>(
    state: &mut LogState<E>,
    config: &RetentionConfig,
    now: i64,
) -> RetentionReport {
    let max_age_ms = duration_millis(config.max_age);
    let session_max_age_ms = duration_millis(config.session_max_age);
    let mut report = RetentionReport::default();

    let before = state.events.len();
    let sessions = &state.sessions;
    let mut kept: Vec<StoredEvent<E>> = std::mem::take(&mut state.events)
        .into_iter()
        .filter(|stored| within_age_limit(stored, sessions, now, max_age_ms, session_max_age_ms))
        .collect();
    report.evicted_by_age = before - kept.len();

    if kept.len() > config.max_events {
        let (active, mut others): (Vec<_>, Vec<_>) = kept
            .into_iter()
            .partition(|stored| in_active_session(stored, sessions, now));

        let allowed = config.max_events.saturating_sub(active.len());
        others.sort_by_key(StoredEvent::sort_key);
        let excess = others.len().saturating_sub(allowed);
        others.drain(..excess);
        report.evicted_by_cap = excess;

        kept = active;
        kept.extend(others);
        kept.sort_by_key(StoredEvent::sort_key);
    } else if !is_chronological(&kept) {
        kept.sort_by_key(StoredEvent::sort_key);
    }

    state.events = kept;
    state.rebuild_indices();
    report.sessions_collected = state.sessions.collect_garbage(now, session_max_age_ms);

    report
}
