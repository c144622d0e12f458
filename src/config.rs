//! Configuration loading for a jsdoctest run.
//!
//! The run-wide [`Config`] is assembled from, lowest to highest priority:
//! 1. built-in defaults
//! 2. `jsdoctest.toml` in the working directory, or the file given with `--config`
//! 3. `JSDOCTEST_*` environment variables
//! 4. command-line flags
//!
//! The result is frozen behind an `Arc` before any documentation is scanned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsdoctest_core::Config;
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "jsdoctest.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value:?} (expected true or false)")]
    InvalidValue { key: &'static str, value: String },
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub assert: Option<String>,
    pub path: Option<PathBuf>,
    pub exit_on_failure: Option<bool>,
    pub exit_with_failure: Option<bool>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(assert) = self.assert {
            config.assert = assert;
        }
        if let Some(path) = self.path {
            config.path = Some(path);
        }
        if let Some(yes) = self.exit_on_failure {
            config.exit_on_failure = yes;
        }
        if let Some(yes) = self.exit_with_failure {
            config.exit_with_failure = yes;
        }
    }
}

/// Assemble the run configuration.
///
/// `explicit` is the `--config` file, which must exist. Without it, `jsdoctest.toml` in `dir` is used
/// when present. `env` looks up environment variables (`std::env::var` in production).
pub fn load(
    explicit: Option<&Path>,
    dir: &Path,
    env: impl Fn(&str) -> Option<String>,
    overrides: Overrides,
) -> Result<Arc<Config>, ConfigError> {
    let mut config = match explicit {
        Some(path) => from_file(path)?,
        None => {
            let local = dir.join(CONFIG_FILE);
            if local.is_file() {
                from_file(&local)?
            } else {
                Config::default()
            }
        }
    };

    apply_env_overrides(&mut config, env)?;
    overrides.apply(&mut config);

    tracing::debug!(?config, "configuration loaded");
    Ok(Arc::new(config))
}

/// Load configuration from a TOML file; missing keys keep their defaults.
pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;

    // A relative `path` in the file is relative to the file's directory
    if let (Some(base), Some(dir)) = (config.path.as_ref(), path.parent()) {
        if base.is_relative() && !dir.as_os_str().is_empty() {
            config.path = Some(dir.join(base));
        }
    }

    Ok(config)
}

/// Apply `JSDOCTEST_*` environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
    if let Some(assert) = env("JSDOCTEST_ASSERT") {
        config.assert = assert;
    }
    if let Some(path) = env("JSDOCTEST_PATH") {
        config.path = Some(PathBuf::from(path));
    }
    if let Some(value) = env("JSDOCTEST_EXIT_ON_FAILURE") {
        config.exit_on_failure = parse_bool("JSDOCTEST_EXIT_ON_FAILURE", &value)?;
    }
    if let Some(value) = env("JSDOCTEST_EXIT_WITH_FAILURE") {
        config.exit_with_failure = parse_bool("JSDOCTEST_EXIT_WITH_FAILURE", &value)?;
    }
    Ok(())
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Default configuration rendered as TOML, for `--print-config`.
pub fn default_config_string() -> String {
    toml::to_string_pretty(&Config::default()).unwrap_or_default()
}
