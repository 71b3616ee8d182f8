//! Dependency health subsystem.
//!
//! # Data Flow
//! ```text
//! Readiness (probe.rs):
//!     DependencyCheck → resolve → TCP connect (bounded) → close
//!
//! State (state.rs):
//!     WaitOutcome per check, GateOutcome for the whole sequence
//!
//! Health page (page.rs):
//!     Ready reports → HTML (+ JSON) → copy into build dir when present
//! ```

pub mod page;
pub mod probe;
pub mod state;

pub use state::{GateOutcome, ReadyReport, WaitOutcome};
