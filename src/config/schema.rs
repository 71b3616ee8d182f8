//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the startup gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Endpoints that must accept TCP connections before dispatch, in order.
    pub dependencies: Vec<DependencyCheck>,

    /// Retry, backoff and deadline settings applied to every check.
    pub wait: WaitConfig,

    /// Commands run for each startup mode.
    pub modes: ModesConfig,

    /// Static health page settings.
    pub health_page: HealthPageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            dependencies: vec![
                DependencyCheck::new("Redis", "redis", 6379),
                DependencyCheck::new("MongoDB", "mongodb", 27017),
            ],
            wait: WaitConfig::default(),
            modes: ModesConfig::default(),
            health_page: HealthPageConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// A single endpoint the gate must see accepting connections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DependencyCheck {
    /// Human readable name used in logs and metrics.
    pub label: String,

    /// Host name or IP address.
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl DependencyCheck {
    pub fn new(label: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            label: label.into(),
            host: host.into(),
            port,
        }
    }

    /// `host:port` form used for connecting and logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for DependencyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.label, self.host, self.port)
    }
}

/// Error returned when a dependency spec string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid dependency '{input}': {reason}")]
pub struct ParseDependencyError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for DependencyCheck {
    type Err = ParseDependencyError;

    /// Parses `host:port` or `label=host:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseDependencyError {
            input: s.to_string(),
            reason,
        };

        let s = s.trim();
        let (label, target) = match s.split_once('=') {
            Some((label, target)) => (Some(label.trim()), target.trim()),
            None => (None, s),
        };

        let (host, port) = target.rsplit_once(':').ok_or_else(|| err("expected host:port"))?;
        let host = host.trim();
        if host.is_empty() {
            return Err(err("host is empty"));
        }
        let port: u16 = port.trim().parse().map_err(|_| err("port is not a number in 1..=65535"))?;
        if port == 0 {
            return Err(err("port must be non-zero"));
        }

        let label = match label {
            Some("") => return Err(err("label is empty")),
            Some(label) => label.to_string(),
            None => host.to_string(),
        };

        Ok(Self::new(label, host, port))
    }
}

/// Parse a comma-separated list of dependency specs.
pub fn parse_dependency_list(list: &str) -> Result<Vec<DependencyCheck>, ParseDependencyError> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::parse::<DependencyCheck>)
        .collect()
}

/// Wait policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Timeout for a single connect attempt in milliseconds.
    pub connect_timeout_ms: u64,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Maximum number of connect attempts per dependency.
    pub max_attempts: u32,

    /// Deadline for a single dependency in seconds.
    pub timeout_secs: u64,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 1000,
            base_delay_ms: 250,
            max_delay_ms: 2000,
            max_attempts: 60,
            timeout_secs: 120,
            jitter: true,
        }
    }
}

impl WaitConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Commands for each startup mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModesConfig {
    pub dev: CommandConfig,
    pub build: CommandConfig,
    pub serve: CommandConfig,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self {
            dev: CommandConfig::npm_script("dev"),
            build: CommandConfig::npm_script("build"),
            serve: CommandConfig::npm_script("serve"),
        }
    }
}

/// An external command the gate hands off to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommandConfig {
    /// Program to execute (looked up on PATH).
    pub program: String,

    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory; inherits the gate's when unset.
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Extra environment variables for the command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CommandConfig {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    fn npm_script(script: &str) -> Self {
        Self::new("npm", ["run", script])
    }

    /// Command line as a single string, for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Static health page configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthPageConfig {
    /// Write the page at all.
    pub enabled: bool,

    /// Where the page is written.
    pub path: String,

    /// Build output directory the page is copied into when it exists.
    pub build_dir: String,

    /// Service name shown on the page.
    pub service_name: String,

    /// Also write a `health.json` next to the page.
    pub write_json: bool,
}

impl Default for HealthPageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "public/health.html".to_string(),
            build_dir: "dist".to_string(),
            service_name: "api-server".to_string(),
            write_json: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Install the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl ObservabilityConfig {
    /// Exporter bind address, when metrics are enabled and the address parses.
    pub fn metrics_listen_addr(&self) -> Option<SocketAddr> {
        if !self.metrics_enabled {
            return None;
        }
        self.metrics_address.parse().ok()
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9464".to_string(),
        }
    }
}
