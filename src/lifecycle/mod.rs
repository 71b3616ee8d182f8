//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Wait for dependencies → Publish health page → Dispatch mode
//!
//! Mode (mode.rs):
//!     CLI argument → StartupMode (fallback: serve)
//!
//! Dispatch (dispatch.rs):
//!     Spawn command → Wait → Exit with child's status
//!
//! Signals (signals.rs) / Shutdown (shutdown.rs):
//!     SIGTERM/SIGINT → cancel the wait, or stop the child after a grace period
//! ```

pub mod dispatch;
pub mod mode;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use mode::StartupMode;
pub use shutdown::Shutdown;
pub use startup::{await_dependencies, run_gate, wait_for_dependency};
