//! Error types for manifest-lint.
//!
//! Only fatal configuration problems are errors. Rule findings (including
//! malformed YAML inside a checked block) are returned as data.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors. Any of these aborts a run before a single
/// rule executes.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required input file is missing.
    #[error("{what} not found: {}", .path.display())]
    NotFound { what: &'static str, path: PathBuf },

    /// Reading an input file failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rules registry is malformed.
    #[error("invalid rules registry {}: {message}", .path.display())]
    Registry { path: PathBuf, message: String },

    /// A rule ID was declared or registered twice.
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),

    /// The declared rule set and the implemented rule set differ.
    #[error("{}", mismatch_message(.declared_only, .implemented_only))]
    RuleSetMismatch {
        declared_only: Vec<String>,
        implemented_only: Vec<String>,
    },

    /// `--only` named rules that do not exist.
    #[error("unknown rule id(s): {}", .0.join(", "))]
    UnknownRules(Vec<String>),

    /// An include entry does not exist on disk.
    #[error("included path does not exist: {}", .0.display())]
    IncludeNotFound(PathBuf),

    /// An include entry is a file with an unsupported extension.
    #[error("unsupported included file type: {} (allowed: .md, .yaml, .yml)", .0.display())]
    UnsupportedInclude(PathBuf),

    /// The MUST-rule coverage inputs are malformed.
    #[error("{0}")]
    Coverage(String),

    /// The project settings file is malformed.
    #[error("invalid settings file {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },
}

fn mismatch_message(declared_only: &[String], implemented_only: &[String]) -> String {
    let mut parts = Vec::new();
    if !declared_only.is_empty() {
        parts.push(format!(
            "rules declared but not implemented: {}",
            declared_only.join(", ")
        ));
    }
    if !implemented_only.is_empty() {
        parts.push(format!(
            "rules implemented but not declared: {}",
            implemented_only.join(", ")
        ));
    }
    parts.join("; ")
}

impl ConfigError {
    /// Wrap an I/O error with the path being read.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a registry error.
    pub fn registry(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Registry {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_lists_both_sides() {
        let err = ConfigError::RuleSetMismatch {
            declared_only: vec!["R999".to_string()],
            implemented_only: vec!["R100".to_string(), "R101".to_string()],
        };
        let message = err.to_string();
        assert_eq!(
            message,
            "rules declared but not implemented: R999; rules implemented but not declared: R100, R101"
        );
    }

    #[test]
    fn test_mismatch_single_side() {
        let err = ConfigError::RuleSetMismatch {
            declared_only: Vec::new(),
            implemented_only: vec!["R100".to_string()],
        };
        assert_eq!(err.to_string(), "rules implemented but not declared: R100");
    }

    #[test]
    fn test_unsupported_include_message() {
        let err = ConfigError::UnsupportedInclude(PathBuf::from("notes.txt"));
        assert_eq!(
            err.to_string(),
            "unsupported included file type: notes.txt (allowed: .md, .yaml, .yml)"
        );
    }
}
