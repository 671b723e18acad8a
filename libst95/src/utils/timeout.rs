// libst95/src/utils/timeout.rs

//! Duration helpers for the chip's millisecond and microsecond budgets.

use std::time::Duration;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convert microseconds to Duration.
pub fn us(us: u64) -> Duration {
    Duration::from_micros(us)
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub fn whole_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
