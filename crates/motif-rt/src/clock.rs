//! Process-wide monotonic microsecond clock
//!
//! All playback deadlines and capture stamps reference the same origin: the
//! first call to `now_micros` in the process. Event offsets are seconds
//! relative to a queue's origin stamp; deadlines are absolute microseconds.

use std::sync::OnceLock;
use std::time::Instant;

/// Microseconds per second, for offset/deadline conversions
pub const ONE_SECOND: u64 = 1_000_000;

static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Monotonic microseconds since the process clock origin
pub fn now_micros() -> u64 {
    ORIGIN.get_or_init(Instant::now).elapsed().as_micros() as u64
}

/// Absolute deadline for an event `offset_seconds` after `origin_micros`
///
/// Negative offsets clamp to the origin itself.
pub fn deadline_micros(origin_micros: u64, offset_seconds: f32) -> u64 {
    let offset = (offset_seconds.max(0.0) as f64 * ONE_SECOND as f64).round() as u64;
    origin_micros.saturating_add(offset)
}

/// Seconds elapsed since `origin_micros` (saturating at zero)
pub fn seconds_since(origin_micros: u64) -> f32 {
    (now_micros().saturating_sub(origin_micros)) as f32 / ONE_SECOND as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let a = now_micros();
        let b = now_micros();
        assert!(b >= a);
    }

    #[test]
    fn test_deadline_math() {
        assert_eq!(deadline_micros(1_000, 0.0), 1_000);
        assert_eq!(deadline_micros(1_000, 0.5), 501_000);
        assert_eq!(deadline_micros(1_000, -1.0), 1_000);
    }
}
