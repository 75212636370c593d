use log::{debug, error, warn};
use std::time::Duration;

use super::error::FetchError;

/// Log target used by [`LogObserver::default`].
pub const DEFAULT_LOG_TARGET: &str = "sarge::collector";

/// Receives progress events from a single collector.
///
/// Each collector holds its own observer, so two collectors can report to
/// different places. Attempts are numbered from 1.
#[cfg_attr(test, mockall::automock)]
pub trait FetchObserver: Send + Sync {
    /// An attempt completed with a status other than 200.
    fn non_success(&self, attempt: u32, max_attempts: u32, status: u16);

    /// The collector is about to wait before the next attempt.
    fn backing_off(&self, attempt: u32, delay: Duration);

    /// The fetch is ending without a payload.
    fn gave_up(&self, error: &FetchError);
}

/// Writes collector events through the `log` facade under a fixed target.
#[derive(Debug, Clone)]
pub struct LogObserver {
    target: String,
}

impl LogObserver {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_TARGET)
    }
}

impl FetchObserver for LogObserver {
    fn non_success(&self, attempt: u32, max_attempts: u32, status: u16) {
        warn!(
            target: self.target.as_str(),
            "Attempt {}/{}: retrieved status code {}", attempt, max_attempts, status
        );
    }

    fn backing_off(&self, attempt: u32, delay: Duration) {
        debug!(
            target: self.target.as_str(),
            "Delaying for {:.3} seconds after attempt {}...",
            delay.as_secs_f64(),
            attempt
        );
    }

    fn gave_up(&self, error: &FetchError) {
        error!(target: self.target.as_str(), "Giving up: {}", error);
    }
}
