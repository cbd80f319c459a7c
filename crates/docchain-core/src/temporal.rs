//! # Ledger Time
//!
//! The ledger stores `block.timestamp` as unsigned integer seconds since the
//! Unix epoch. No arithmetic is performed on that integer; it is converted to
//! a UTC calendar timestamp exactly once, when a record crosses the ledger
//! client boundary.

use chrono::{DateTime, Utc};

/// Convert ledger epoch seconds into a UTC timestamp.
///
/// Returns `None` for values outside the range `chrono` can represent.
pub fn from_ledger_seconds(seconds: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(seconds).ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0)
}

/// Current time as ledger epoch seconds.
///
/// Used by in-process ledgers to stamp `block.timestamp`.
pub fn ledger_seconds_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}
