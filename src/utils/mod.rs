//! Utility functions and helpers
//!
//! Clock abstraction and atomic file writes.

pub mod atomic;
pub mod clock;

pub use atomic::atomic_write_with;
pub use clock::{duration_millis, system_clock, Clock, ManualClock, SharedClock, SystemClock};
