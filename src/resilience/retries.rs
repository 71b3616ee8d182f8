//! Retry budget for dependency waits.
//!
//! # Responsibilities
//! - Track attempts and elapsed time for one dependency
//! - Decide whether another attempt is allowed
//! - Produce the next delay, clipped to the remaining deadline
//!
//! # Design Decisions
//! - Both an attempt cap and a wall-clock deadline; whichever hits first wins
//! - No attempt is started once the deadline has passed

use std::time::Duration;
use tokio::time::Instant;

use crate::config::WaitConfig;
use crate::resilience::backoff::{calculate_backoff, calculate_backoff_exact};

/// Backoff schedule and budget applied to every dependency check.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub connect_timeout: Duration,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
    pub timeout: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Delay to sleep after `failed_attempts` failures.
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        if self.jitter {
            calculate_backoff(failed_attempts, self.base_delay_ms, self.max_delay_ms)
        } else {
            calculate_backoff_exact(failed_attempts, self.base_delay_ms, self.max_delay_ms)
        }
    }

    /// Start tracking a fresh budget.
    pub fn start(&self) -> RetryBudget<'_> {
        RetryBudget {
            policy: self,
            started: Instant::now(),
            attempts: 0,
        }
    }
}

impl From<&WaitConfig> for RetryPolicy {
    fn from(config: &WaitConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            max_attempts: config.max_attempts,
            timeout: config.timeout(),
            jitter: config.jitter,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&WaitConfig::default())
    }
}

/// Attempt and deadline bookkeeping for a single dependency.
#[derive(Debug)]
pub struct RetryBudget<'a> {
    policy: &'a RetryPolicy,
    started: Instant,
    attempts: u32,
}

impl RetryBudget<'_> {
    /// Record the start of an attempt. Returns `false` when the budget is spent.
    pub fn begin_attempt(&mut self) -> bool {
        if self.attempts >= self.policy.max_attempts || self.remaining().is_zero() {
            return false;
        }
        self.attempts += 1;
        true
    }

    /// Delay before the next attempt, or `None` if no attempt will follow.
    pub fn next_delay(&self) -> Option<Duration> {
        if self.attempts >= self.policy.max_attempts {
            return None;
        }
        let remaining = self.remaining();
        if remaining.is_zero() {
            return None;
        }
        Some(self.policy.delay_after(self.attempts).min(remaining))
    }

    /// Connect timeout for the current attempt, clipped to the deadline.
    pub fn attempt_timeout(&self) -> Duration {
        self.policy.connect_timeout.min(self.remaining())
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.policy.timeout.saturating_sub(self.elapsed())
    }
}
