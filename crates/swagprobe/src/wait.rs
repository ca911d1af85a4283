//! Bounded polling.
//!
//! Every expectation and every auto-waiting action is driven by
//! [`poll_until`]: observe, test, sleep a fixed interval, repeat until the
//! condition holds or the deadline passes. The result is typed, so callers
//! decide how a timeout is reported.

use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Default budget for expectations and actions (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Deadline and interval of a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Total budget
    pub timeout: Duration,
    /// Sleep between observations
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl PollConfig {
    /// Create a config with the given timeout and the default interval
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timeout in whole milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Result of a poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The condition held
    Satisfied {
        /// Observation that satisfied the condition
        value: T,
        /// Observations made
        attempts: u32,
        /// Time spent
        elapsed: Duration,
    },
    /// The deadline passed first
    TimedOut {
        /// Last observation before the deadline
        last: T,
        /// Observations made
        attempts: u32,
        /// Time spent
        elapsed: Duration,
    },
}

impl<T> PollOutcome<T> {
    /// Whether the condition held
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }

    /// Number of observations made
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Satisfied { attempts, .. } | Self::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// Last observation, whichever way the loop ended
    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Self::Satisfied { value, .. } => value,
            Self::TimedOut { last, .. } => last,
        }
    }
}

/// Observe until `satisfied` holds or the deadline passes.
///
/// At least one observation is always made, even with a zero timeout.
/// Errors from `observe` abort the loop immediately.
pub async fn poll_until<T, F, Fut, P>(
    config: &PollConfig,
    mut observe: F,
    mut satisfied: P,
) -> ProbeResult<PollOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
    P: FnMut(&T) -> bool,
{
    let start = Instant::now();
    let deadline = start + config.timeout;
    let mut attempts = 0u32;

    loop {
        attempts = attempts.saturating_add(1);
        let value = observe().await?;

        if satisfied(&value) {
            return Ok(PollOutcome::Satisfied {
                value,
                attempts,
                elapsed: start.elapsed(),
            });
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(PollOutcome::TimedOut {
                last: value,
                attempts,
                elapsed: start.elapsed(),
            });
        }

        tokio::time::sleep(config.interval.min(deadline - now)).await;
    }
}
