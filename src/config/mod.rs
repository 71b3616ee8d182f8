//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → GATE_* environment variables
//!     → command line overrides
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the gate runs with no config file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError, ConfigOverrides};
pub use schema::CommandConfig;
pub use schema::DependencyCheck;
pub use schema::GateConfig;
pub use schema::HealthPageConfig;
pub use schema::WaitConfig;
