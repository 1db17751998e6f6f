//! Transaction-time and valid-time timestamps.
//!
//! All times are epoch milliseconds. `INFINITY_TIME` (-1) is the
//! distinguished sentinel for an open-ended `deletedAt` or `validTo`.

use std::time::{SystemTime, UNIX_EPOCH};

/// Epoch-millisecond timestamp.
pub type Timestamp = i64;

/// Sentinel denoting an open-ended time (`deletedAt` of the live
/// version, `validTo` of an open interval).
pub const INFINITY_TIME: Timestamp = -1;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

/// True when `ts` is the open-ended sentinel.
pub fn is_open_ended(ts: Timestamp) -> bool {
    ts == INFINITY_TIME
}
