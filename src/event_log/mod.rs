//! Event Log Module
//!
//! The generic engine behind the agent, diagnostic and hook stores:
//! - `EventLog`: append-ordered log with classification, session and run indices
//! - `SessionTracker`: which sessions are active, idle or completed
//! - `retention`: age filter + active-preserving count cap after every insert
//! - `EventQuery`: conjunctive filters with most-recent-N limits
//!
//! # Write path
//!
//! ```text
//! ┌─────────┐    ┌──────────────┐    ┌──────────────┐    ┌────────────────┐
//! │ add()   │───►│ assign id +  │───►│ touch session│───►│ retention pass │
//! │         │    │ timestamp    │    │ index event  │    │ rebuild indices│
//! └─────────┘    └──────────────┘    └──────────────┘    └────────────────┘
//! ```

mod query;
mod record;
mod retention;
mod sessions;
mod store;

pub use query::EventQuery;
pub use record::{LogRecord, StoredEvent};
pub use sessions::SessionState;
pub use store::{EventLog, RetentionConfig};
