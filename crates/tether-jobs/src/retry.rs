// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job outcomes and backoff policy.
//!
//! Jobs report `Retry` as a returned value, never as an exception; the
//! scheduler owns the backoff timing. Jobs never report a permanent
//! failure: a persistent upstream bug retries indefinitely, which is
//! accepted for best-effort background work and surfaced through the
//! `tether_jobs_retries_total` counter.

use std::time::Duration;

use tether_config::model::JobsConfig;

/// Result of one job execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The job completed; nothing further to do.
    Done,
    /// The job should run again after backoff.
    Retry,
}

/// Exponential backoff with an upper bound.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    base: Duration,
    cap: Duration,
}

impl RetryPolicy {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    pub fn from_config(config: &JobsConfig) -> Self {
        Self::new(
            Duration::from_millis(config.retry_base_ms),
            Duration::from_millis(config.retry_cap_ms),
        )
    }

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`,
    /// capped.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt.min(20)).unwrap_or(u32::MAX);
        self.base.checked_mul(factor).unwrap_or(self.cap).min(self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_until_the_cap() {
        let policy = RetryPolicy::new(Duration::from_secs(1), Duration::from_secs(60));
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(3), Duration::from_secs(8));
        assert_eq!(policy.delay(6), Duration::from_secs(60));
        assert_eq!(policy.delay(31), Duration::from_secs(60));
    }

    #[test]
    fn config_values_feed_the_policy() {
        let config = JobsConfig {
            periodic_interval_secs: 900,
            retry_base_ms: 250,
            retry_cap_ms: 1_000,
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.delay(0), Duration::from_millis(250));
        assert_eq!(policy.delay(5), Duration::from_millis(1_000));
    }
}
