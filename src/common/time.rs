//! Simple time helpers used by multiple services.

use chrono::{DateTime, Utc};
use std::time::Instant;

/// Current wall-clock time, used for audit records and artifact stamps.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds elapsed since `start`.
pub fn elapsed_ms(start: Instant) -> u128 {
    start.elapsed().as_millis()
}
