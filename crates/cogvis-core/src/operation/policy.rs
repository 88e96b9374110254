//! Attempt budget and delay of a poll session.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Largest accepted attempt budget.
pub const MAX_ATTEMPTS_LIMIT: u32 = 10_000;

/// Default delay between status queries: 1 second.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Attempt budget and fixed delay governing a poll session.
///
/// With `max_attempts = N`, an operation that never leaves `NotStarted` or
/// `Running` is queried exactly `N + 1` times, with `N` delays in between,
/// before the session times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct PollPolicy {
    /// Number of pending results tolerated before giving up
    #[cfg_attr(
        feature = "config",
        arg(
            long = "poll-max-attempts",
            env = "POLL_MAX_ATTEMPTS",
            default_value_t = DEFAULT_MAX_ATTEMPTS,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_ATTEMPTS_LIMIT))
        )
    )]
    #[serde(
        default = "default_max_attempts",
        deserialize_with = "deserialize_max_attempts"
    )]
    max_attempts: u32,

    /// Delay between status queries in milliseconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "poll-interval-ms",
            env = "POLL_INTERVAL_MS",
            default_value_t = DEFAULT_INTERVAL_MS
        )
    )]
    #[serde(default = "default_interval_ms")]
    interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn deserialize_max_attempts<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let max_attempts = u32::deserialize(deserializer)?;
    check_max_attempts(max_attempts).map_err(serde::de::Error::custom)
}

fn check_max_attempts(max_attempts: u32) -> Result<u32> {
    if (1..=MAX_ATTEMPTS_LIMIT).contains(&max_attempts) {
        Ok(max_attempts)
    } else {
        Err(Error::invalid_input().with_message(format!(
            "Poll policy needs between 1 and {MAX_ATTEMPTS_LIMIT} attempts, got {max_attempts}"
        )))
    }
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl PollPolicy {
    /// Creates a policy. The interval is kept with millisecond precision.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if `max_attempts` is zero or above
    /// [`MAX_ATTEMPTS_LIMIT`].
    pub fn new(max_attempts: u32, interval: Duration) -> Result<Self> {
        Ok(Self {
            max_attempts: check_max_attempts(max_attempts)?,
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Returns the attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay between status queries.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Returns the worst case time spent sleeping before a timeout.
    pub fn max_wait(&self) -> Duration {
        self.interval().saturating_mul(self.max_attempts())
    }

    /// Set the attempt budget, ignoring zero and capping at [`MAX_ATTEMPTS_LIMIT`].
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        if max_attempts > 0 {
            self.max_attempts = max_attempts.min(MAX_ATTEMPTS_LIMIT);
        }
        self
    }

    /// Set the delay between status queries.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
