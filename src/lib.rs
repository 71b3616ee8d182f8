//! Container startup gate library.
//!
//! Waits for dependent TCP services, publishes a static health page and
//! hands off to the selected startup mode's command.

pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::GateConfig;
pub use error::GateError;
pub use lifecycle::{Shutdown, StartupMode};
