//! Top-level error type and process exit codes.

use std::time::Duration;

use crate::config::ConfigError;
use crate::health::page::PageError;
use crate::lifecycle::dispatch::DispatchError;

/// Exit codes reported by the gate itself (sysexits-style).
pub mod exit_codes {
    pub const CONFIG: i32 = 78;
    pub const UNAVAILABLE: i32 = 69;
    pub const IO: i32 = 74;
    pub const SPAWN: i32 = 127;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("dependency {label} ({address}) not reachable after {attempts} attempt(s) in {elapsed:?}: {last_error}")]
    DependencyTimedOut {
        label: String,
        address: String,
        attempts: u32,
        elapsed: Duration,
        last_error: String,
    },

    #[error("cancelled while waiting for dependencies")]
    Cancelled,

    #[error("health page: {0}")]
    HealthPage(#[from] PageError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl GateError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            GateError::Config(_) => exit_codes::CONFIG,
            GateError::DependencyTimedOut { .. } => exit_codes::UNAVAILABLE,
            GateError::Cancelled => exit_codes::CANCELLED,
            GateError::HealthPage(_) => exit_codes::IO,
            GateError::Dispatch(DispatchError::Spawn { .. }) => exit_codes::SPAWN,
            GateError::Dispatch(DispatchError::Wait(_)) => exit_codes::IO,
        }
    }
}
