//! Default values for astfacts configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Walk Defaults
// ============================================================================

/// Whether `.gitignore` rules are honoured while walking a project.
///
/// Off by default: every file under the base directory is a candidate.
pub const DEFAULT_RESPECT_GITIGNORE: bool = false;

/// Whether hidden files and directories are skipped.
pub const DEFAULT_SKIP_HIDDEN: bool = false;

/// Directory names never descended into.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[];

// ============================================================================
// Parse Defaults
// ============================================================================

/// Maximum syntax tree nesting the walker follows before giving up on a file.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

// ============================================================================
// Log Defaults
// ============================================================================

/// Default log level when neither `RUST_LOG` nor the CLI sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// ============================================================================
// Config Locations
// ============================================================================

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "astfacts.toml";

/// Directory under the user config dir holding `config.toml`.
pub const USER_CONFIG_DIR: &str = "astfacts";
