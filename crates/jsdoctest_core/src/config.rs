//! Run-wide configuration consumed by test cases.
//!
//! A `Config` is built once per run (see the `jsdoctest` crate for file/env/CLI layering), then
//! frozen behind an `Arc` and shared by every [`TestCase`](crate::TestCase).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Selector used when neither the config nor the sample names an assertion library.
pub const DEFAULT_ASSERT: &str = "node";

/// Run-wide configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Assertion library selector (`node`, `chai`, `chai-expect`, `chai-assert`, `expect`, `expect.js`)
    pub assert: String,
    /// Base directory for relative module resolution
    pub path: Option<PathBuf>,
    /// Abort right after reporting a batch that contained failures
    #[serde(alias = "exitOnFailure")]
    pub exit_on_failure: bool,
    /// Finish the run with a failing status when any test failed
    #[serde(alias = "exitWithFailure")]
    pub exit_with_failure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assert: DEFAULT_ASSERT.to_string(),
            path: None,
            exit_on_failure: false,
            exit_with_failure: true,
        }
    }
}

impl Config {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the assertion library selector
    pub fn with_assert(mut self, assert: impl Into<String>) -> Self {
        self.assert = assert.into();
        self
    }

    /// Set the base path for relative `require` calls
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_exit_on_failure(mut self, yes: bool) -> Self {
        self.exit_on_failure = yes;
        self
    }

    pub fn with_exit_with_failure(mut self, yes: bool) -> Self {
        self.exit_with_failure = yes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.assert, "node");
        assert_eq!(config.path, None);
        assert!(!config.exit_on_failure);
        assert!(config.exit_with_failure);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::new()
            .with_assert("chai")
            .with_path("/project")
            .with_exit_on_failure(true)
            .with_exit_with_failure(false);
        assert_eq!(config.assert, "chai");
        assert_eq!(config.path, Some(PathBuf::from("/project")));
        assert!(config.exit_on_failure);
        assert!(!config.exit_with_failure);
    }

    #[test]
    fn test_deserialize_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "assert": "chai-expect" }"#).unwrap();
        assert_eq!(config.assert, "chai-expect");
        assert!(config.exit_with_failure);
    }

    #[test]
    fn test_deserialize_camel_case_aliases() {
        let config: Config =
            serde_json::from_str(r#"{ "exitOnFailure": true, "exitWithFailure": false }"#).unwrap();
        assert!(config.exit_on_failure);
        assert!(!config.exit_with_failure);
    }
}
