//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Dependency check:
//!     → retries.rs (attempt cap + deadline bookkeeping)
//!     → timeouts.rs (bound each connect attempt)
//!     → On failure: backoff.rs (next delay, exponential + jitter)
//! ```
//!
//! # Design Decisions
//! - Every wait is bounded; there is no retry-forever mode
//! - Delays grow exponentially and are capped

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{RetryBudget, RetryPolicy};
