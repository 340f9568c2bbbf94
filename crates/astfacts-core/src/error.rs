//! Error types for fact extraction.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::parser::WalkStats;

/// Errors that abort a whole project run.
///
/// Per-file problems (syntax errors, undecodable content, walks that nest
/// too deeply) are not represented here; they are logged and the run moves
/// on to the next file.
#[derive(Debug, Error)]
pub enum FactError {
    /// The trunk key is neither `<int>` nor `<int>_<int>`.
    #[error("invalid trunk key format: {0}")]
    InvalidTrunkFormat(String),

    /// Filesystem error while enumerating or reading the project.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("Directory walk failed at {path}: {message}")]
    Walk { path: String, message: String },

    /// A tree-sitter grammar could not be loaded.
    #[error("Failed to load {language} grammar: {message}")]
    Grammar { language: String, message: String },

    /// No front end is registered under the given name.
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    /// The output stream rejected a fact.
    #[error("Failed to emit fact: {0}")]
    Emit(String),

    /// Fact serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FactError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FactError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ignore::Error> for FactError {
    fn from(err: ignore::Error) -> Self {
        let path = match &err {
            ignore::Error::WithPath { path, .. } => path.display().to_string(),
            _ => String::new(),
        };
        FactError::Walk {
            path,
            message: err.to_string(),
        }
    }
}

/// Failure while walking one file's syntax tree.
///
/// Facts emitted before the failure stay in the stream; the caller logs
/// the error and continues with the next file.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Nesting exceeded the configured maximum depth. `stats` counts what
    /// was emitted before the walk stopped.
    #[error("syntax tree nests deeper than {depth} levels")]
    TooDeep { depth: usize, stats: WalkStats },

    /// The output stream failed. This one is fatal for the run.
    #[error(transparent)]
    Fatal(#[from] FactError),
}
