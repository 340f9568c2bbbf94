//! Configuration management for astfacts.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. An explicit file passed on the command line
//! 3. Project-local `astfacts.toml` file
//! 4. User config `~/.config/astfacts/config.toml`
//! 5. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project walk configuration.
    pub walk: WalkConfig,

    /// Per-file parse configuration.
    pub parse: ParseConfig,

    /// Logging configuration.
    pub log: LogConfig,

    /// Per-namespace extension overrides, e.g. `ts = ["ts", "mts"]`.
    pub languages: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./astfacts.toml` (project local)
    /// 2. `~/.config/astfacts/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(PROJECT_CONFIG_FILE).exists() {
            return Self::from_file(PROJECT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(policy) = std::env::var("ASTFACTS_SYNTAX_ERRORS") {
            self.parse.syntax_errors = policy.parse()?;
        }
        if let Ok(depth) = std::env::var("ASTFACTS_MAX_DEPTH") {
            if let Ok(n) = depth.parse() {
                self.parse.max_depth = n;
            }
        }
        if let Ok(size) = std::env::var("ASTFACTS_MAX_FILE_SIZE") {
            if let Ok(n) = size.parse() {
                self.walk.max_file_size = Some(n);
            }
        }
        if let Ok(level) = std::env::var("ASTFACTS_LOG_LEVEL") {
            self.log.level = level;
        }
        Ok(())
    }

    /// Extension override for a namespace, if one is configured.
    pub fn extensions_for(&self, namespace: &str) -> Option<&[String]> {
        self.languages.get(namespace).map(|v| v.as_slice())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Project walk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Honour `.gitignore`/`.ignore` files.
    pub respect_gitignore: bool,

    /// Skip hidden files and directories.
    pub skip_hidden: bool,

    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,

    /// Files larger than this (in bytes) are skipped. Unlimited when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: DEFAULT_RESPECT_GITIGNORE,
            skip_hidden: DEFAULT_SKIP_HIDDEN,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            max_file_size: None,
        }
    }
}

/// What to do with a file whose syntax tree contains `ERROR` nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxErrorPolicy {
    /// Treat the file as unparseable: no facts, one log line.
    #[default]
    Skip,
    /// Walk whatever tree came back; `ERROR` nodes are pruned.
    Tolerate,
}

impl std::str::FromStr for SyntaxErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "tolerate" => Ok(Self::Tolerate),
            other => Err(ConfigError::Invalid(format!(
                "syntax_errors must be \"skip\" or \"tolerate\", got \"{}\"",
                other
            ))),
        }
    }
}

/// Per-file parse configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Handling of files with syntax errors.
    pub syntax_errors: SyntaxErrorPolicy,

    /// Maximum nesting depth the tree walker follows.
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            syntax_errors: SyntaxErrorPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level filter used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.parse.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.parse.syntax_errors, SyntaxErrorPolicy::Skip);
        assert!(!config.walk.respect_gitignore);
        assert_eq!(config.log.level, DEFAULT_LOG_LEVEL);
        assert!(config.languages.is_empty());
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[walk]"));
        assert!(toml_str.contains("[parse]"));
        assert!(toml_str.contains("syntax_errors = \"skip\""));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("TOLERATE".parse::<SyntaxErrorPolicy>().unwrap(), SyntaxErrorPolicy::Tolerate);
        assert!("lenient".parse::<SyntaxErrorPolicy>().is_err());
    }
}
