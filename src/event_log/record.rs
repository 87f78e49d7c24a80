//! Stored event records and the extractor trait

use serde::Serialize;

/// How an event kind is indexed by [`super::EventLog`]
///
/// One implementation per event kind replaces hand-written copies of the
/// store: the log only ever sees events through these extractors.
pub trait LogRecord: Clone + Send + Sync + 'static {
    /// Short name of the event kind, used in logs
    const KIND: &'static str;

    /// Prefix for rendered ids, so ids from different stores never collide
    const ID_PREFIX: &'static str;

    /// Whether this kind carries run ids (and honours run-id filters)
    const HAS_RUN_ID: bool = false;

    /// Primary index key: stream name, diagnostic type or hook name
    fn classification_key(&self) -> &str;

    fn session_key(&self) -> Option<&str>;

    fn run_id(&self) -> Option<&str> {
        None
    }

    /// Render a store-assigned id with this kind's prefix, e.g. `evt-42`
    fn display_id(id: u64) -> String {
        format!("{}-{}", Self::ID_PREFIX, id)
    }
}

/// An event as held by the log: immutable once created
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent<E> {
    /// Store-local id, strictly increasing
    pub id: u64,
    /// Creation time in Unix milliseconds, assigned by the store
    pub timestamp: i64,
    pub event: E,
}

impl<E: LogRecord> StoredEvent<E> {
    /// Id with the store's prefix, e.g. `evt-42`
    pub fn display_id(&self) -> String {
        E::display_id(self.id)
    }

    pub fn classification_key(&self) -> &str {
        self.event.classification_key()
    }

    pub fn session_key(&self) -> Option<&str> {
        self.event.session_key()
    }

    pub fn run_id(&self) -> Option<&str> {
        self.event.run_id()
    }

    /// Milliseconds elapsed since creation
    pub fn age_at(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    pub(crate) fn sort_key(&self) -> (i64, u64) {
        (self.timestamp, self.id)
    }
}
