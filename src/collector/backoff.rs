//! Wait schedule between attempts.
//!
//! The delay after attempt `i` (0-based) is `min(2^i, cap)` seconds. With a
//! cap of one second or more this is 1s after the first attempt and the cap
//! from then on; the exponential term only shows when the cap is large.

use std::time::Duration;

/// Delay to wait after the 0-based attempt `attempt` failed.
pub fn backoff_delay(attempt: u32, cap_secs: f64) -> Duration {
    let exponential = 2f64.powi(attempt.min(1023) as i32);
    let seconds = exponential.min(cap_secs).max(0.0);
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

/// All delays a fetch with `max_attempts` would sleep through if every attempt failed.
pub fn schedule(max_attempts: u32, cap_secs: f64) -> impl Iterator<Item = Duration> {
    (0..max_attempts.saturating_sub(1)).map(move |attempt| backoff_delay(attempt, cap_secs))
}
