//! Dependency wait state.
//!
//! # States
//! ```text
//! WAITING(check_i) → READY(check_i) → WAITING(check_i+1) → ... → all READY
//! WAITING(check_i) → TIMED_OUT(check_i)     (terminal, no dispatch)
//! WAITING(check_i) → CANCELLED              (terminal, no dispatch)
//! ```

use std::time::Duration;

use serde::Serialize;

use crate::config::DependencyCheck;

/// Result of waiting on a single dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready {
        attempts: u32,
        elapsed: Duration,
    },
    TimedOut {
        attempts: u32,
        elapsed: Duration,
        last_error: String,
    },
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            WaitOutcome::Ready { attempts, .. } | WaitOutcome::TimedOut { attempts, .. } => *attempts,
        }
    }
}

/// A dependency that became ready, for logs and the health JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyReport {
    pub label: String,
    pub address: String,
    pub attempts: u32,
    pub elapsed_ms: u64,
}

impl ReadyReport {
    pub fn new(check: &DependencyCheck, attempts: u32, elapsed: Duration) -> Self {
        Self {
            label: check.label.clone(),
            address: check.address(),
            attempts,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Result of the whole gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Every check became reachable, in order.
    Ready(Vec<ReadyReport>),
    /// The first check that exhausted its budget. Later checks were not tried.
    TimedOut {
        check: DependencyCheck,
        attempts: u32,
        elapsed: Duration,
        last_error: String,
    },
    /// A shutdown signal arrived while waiting.
    Cancelled,
}
