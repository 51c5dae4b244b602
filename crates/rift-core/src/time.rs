//! Wall-clock helpers for binaries.
//!
//! Engine APIs never read the clock themselves; every per-frame entry point
//! takes an explicit `now_ms` so tests can drive time deterministically.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
