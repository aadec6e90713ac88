//! Hiring board domain model.
//!
//! # Responsibility
//! - Define the records persisted in the four board collections.
//! - Provide synchronous validation that runs before any store call.
//!
//! # Invariants
//! - Every record is identified by a stable key (`Uuid`, or job id for assessments).
//! - Timestamps are Unix epoch milliseconds.

pub mod assessment;
pub mod candidate;
pub mod job;
pub mod timeline;
pub mod validation;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in epoch milliseconds.
///
/// Falls back to `0` if the clock reports a time before the Unix epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
