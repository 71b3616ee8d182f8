//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{parse_dependency_list, DependencyCheck, GateConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding a comma-separated dependency list.
pub const ENV_DEPENDENCIES: &str = "GATE_DEPENDENCIES";
/// Environment variable overriding the per-dependency deadline.
pub const ENV_TIMEOUT_SECS: &str = "GATE_TIMEOUT_SECS";
/// Environment variable overriding the log format.
pub const ENV_LOG_FORMAT: &str = "GATE_LOG_FORMAT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "IO error reading {}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Invalid {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Values given on the command line. They win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dependencies: Option<Vec<DependencyCheck>>,
    pub timeout_secs: Option<u64>,
    pub log_format: Option<String>,
}

fn read_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Resolve the effective configuration.
///
/// Layers, lowest first: defaults, the optional file, environment variables
/// read through `env`, then `overrides`. Validation runs once on the result.
pub fn resolve_config<F>(
    path: Option<&Path>,
    env: F,
    overrides: &ConfigOverrides,
) -> Result<GateConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GateConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;

    if let Some(deps) = &overrides.dependencies {
        config.dependencies = deps.clone();
    }
    if let Some(secs) = overrides.timeout_secs {
        config.wait.timeout_secs = secs;
    }
    if let Some(format) = &overrides.log_format {
        config.observability.log_format = format.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `GATE_*` environment variables on top of `config`.
pub fn apply_env_overrides<F>(config: &mut GateConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(list) = env(ENV_DEPENDENCIES) {
        config.dependencies = parse_dependency_list(&list).map_err(|e| ConfigError::Env {
            var: ENV_DEPENDENCIES,
            message: e.to_string(),
        })?;
    }

    if let Some(secs) = env(ENV_TIMEOUT_SECS) {
        config.wait.timeout_secs = secs.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_TIMEOUT_SECS,
            message: format!("'{}' is not a whole number of seconds", secs),
        })?;
    }

    if let Some(format) = env(ENV_LOG_FORMAT) {
        config.observability.log_format = format.trim().to_string();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(None, env_from(&[]), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.dependencies.len(), 2);
    }

    #[test]
    fn test_env_overrides_file_and_cli_overrides_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[wait]\ntimeout_secs = 10\nmax_attempts = 3").unwrap();

        let env = env_from(&[
            (ENV_DEPENDENCIES, "cache=redis:6380"),
            (ENV_TIMEOUT_SECS, "30"),
        ]);
        let config = resolve_config(Some(file.path()), &env, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.dependencies, vec![DependencyCheck::new("cache", "redis", 6380)]);
        assert_eq!(config.wait.timeout_secs, 30);
        assert_eq!(config.wait.max_attempts, 3);

        let overrides = ConfigOverrides {
            timeout_secs: Some(5),
            dependencies: Some(vec![]),
            log_format: Some("json".into()),
        };
        let config = resolve_config(Some(file.path()), &env, &overrides).unwrap();
        assert_eq!(config.wait.timeout_secs, 5);
        assert!(config.dependencies.is_empty());
        assert_eq!(config.observability.log_format, "json");
    }

    #[test]
    fn test_bad_env_value() {
        let err = resolve_config(
            None,
            env_from(&[(ENV_TIMEOUT_SECS, "soon")]),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_TIMEOUT_SECS, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = resolve_config(
            Some(Path::new("/nonexistent/gate.toml")),
            env_from(&[]),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[wait]\ntimeout_secs = 0").unwrap();
        let err = resolve_config(Some(file.path()), env_from(&[]), &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("wait.timeout_secs"));
    }
}
