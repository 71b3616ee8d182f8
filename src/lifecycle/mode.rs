//! Startup mode selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::schema::{CommandConfig, ModesConfig};

/// Which external command the gate hands off to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupMode {
    Dev,
    Build,
    /// Used when no mode, or an unrecognized one, is given.
    #[default]
    Serve,
}

/// Error for strict parsing; [`StartupMode::from_arg`] never fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown startup mode '{0}', expected dev, build or serve")]
pub struct UnknownMode(pub String);

impl StartupMode {
    pub const ALL: [StartupMode; 3] = [StartupMode::Dev, StartupMode::Build, StartupMode::Serve];

    /// Select a mode from the command line argument.
    ///
    /// Absent or unrecognized arguments fall back to [`StartupMode::Serve`].
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => StartupMode::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e: UnknownMode| {
                tracing::warn!(error = %e, fallback = %StartupMode::default(), "Falling back to default startup mode");
                StartupMode::default()
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StartupMode::Dev => "dev",
            StartupMode::Build => "build",
            StartupMode::Serve => "serve",
        }
    }

    /// The configured command for this mode.
    pub fn command<'a>(&self, modes: &'a ModesConfig) -> &'a CommandConfig {
        match self {
            StartupMode::Dev => &modes.dev,
            StartupMode::Build => &modes.build,
            StartupMode::Serve => &modes.serve,
        }
    }
}

impl FromStr for StartupMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(StartupMode::Dev),
            "build" => Ok(StartupMode::Build),
            "serve" => Ok(StartupMode::Serve),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for StartupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
