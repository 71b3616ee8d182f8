//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays > 0, ports valid)
//! - Detect duplicate dependency labels
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::GateConfig;
use crate::observability::logging::LogFormat;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut labels = HashSet::new();
    for (i, dep) in config.dependencies.iter().enumerate() {
        let field = format!("dependencies[{}]", i);
        if dep.label.trim().is_empty() {
            errors.push(ValidationError::new(format!("{field}.label"), "must not be empty"));
        } else if !labels.insert(dep.label.as_str()) {
            errors.push(ValidationError::new(
                format!("{field}.label"),
                format!("duplicate label '{}'", dep.label),
            ));
        }
        if dep.host.trim().is_empty() {
            errors.push(ValidationError::new(format!("{field}.host"), "must not be empty"));
        }
        if dep.port == 0 {
            errors.push(ValidationError::new(format!("{field}.port"), "must be non-zero"));
        }
    }

    let wait = &config.wait;
    if wait.connect_timeout_ms == 0 {
        errors.push(ValidationError::new("wait.connect_timeout_ms", "must be greater than 0"));
    }
    if wait.base_delay_ms == 0 {
        errors.push(ValidationError::new("wait.base_delay_ms", "must be greater than 0"));
    }
    if wait.base_delay_ms > wait.max_delay_ms {
        errors.push(ValidationError::new(
            "wait.max_delay_ms",
            format!("must be at least base_delay_ms ({})", wait.base_delay_ms),
        ));
    }
    if wait.max_attempts == 0 {
        errors.push(ValidationError::new("wait.max_attempts", "must be greater than 0"));
    }
    if wait.timeout_secs == 0 {
        errors.push(ValidationError::new("wait.timeout_secs", "must be greater than 0"));
    }

    for (name, command) in [
        ("dev", &config.modes.dev),
        ("build", &config.modes.build),
        ("serve", &config.modes.serve),
    ] {
        if command.program.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("modes.{name}.program"),
                "must not be empty",
            ));
        }
    }

    if config.health_page.enabled && config.health_page.path.trim().is_empty() {
        errors.push(ValidationError::new("health_page.path", "must not be empty"));
    }

    let obs = &config.observability;
    if obs.log_format.parse::<LogFormat>().is_err() {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}', expected 'pretty' or 'json'", obs.log_format),
        ));
    }
    if obs.metrics_enabled && obs.metrics_listen_addr().is_none() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
