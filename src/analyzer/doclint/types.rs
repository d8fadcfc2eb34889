//! Core types for the doclint engine.
//!
//! - `Severity` - Violation severity declared by the registry
//! - `RuleCode` - Rule identifiers (e.g., "R001")
//! - `Violation` - A single finding with its exact source location

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Reserved rule ID for YAML that failed to parse.
pub const PARSE_RULE_ID: &str = "R000";

/// Severity levels for violations.
///
/// Severity is informational: any violation fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed
    #[default]
    Error,
    /// Should be fixed
    Warning,
}

impl Severity {
    /// Parse a registry severity. Only the exact lowercase names are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = |s: &Severity| match s {
            Severity::Error => 1,
            Severity::Warning => 0,
        };
        rank(self).cmp(&rank(other))
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A rule identifier (e.g., "R001").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RuleCode(pub String);

impl RuleCode {
    /// Create a new rule code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the reserved parse-failure code.
    pub fn is_parse_failure(&self) -> bool {
        self.0 == PARSE_RULE_ID
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RuleCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A rule violation found during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// The rule that produced the finding. Severity and scope are resolved
    /// through this ID, not through the rule that emitted it.
    #[serde(rename = "ruleId")]
    pub rule_id: RuleCode,
    /// The file the finding belongs to.
    pub path: PathBuf,
    /// Absolute 1-indexed line in `path`.
    pub line: u32,
    /// Human-readable description.
    pub message: String,
    /// Severity, overwritten by the registry after the rule runs.
    pub severity: Severity,
}

impl Violation {
    /// Create a new violation with the default severity.
    pub fn new(
        rule_id: impl Into<RuleCode>,
        path: impl Into<PathBuf>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            path: path.into(),
            line,
            message: message.into(),
            severity: Severity::default(),
        }
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Path rendered the way it is compared and printed.
    pub fn path_str(&self) -> std::borrow::Cow<'_, str> {
        self.path.to_string_lossy()
    }

    /// Path shown relative to `root` when it lives below it.
    pub fn display_path(&self, root: &Path) -> String {
        match self.path.strip_prefix(root) {
            Ok(rel) => to_slash(rel),
            Err(_) => self.path_str().into_owned(),
        }
    }
}

impl Ord for Violation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path_str()
            .cmp(&other.path_str())
            .then_with(|| self.line.cmp(&other.line))
            .then_with(|| self.rule_id.cmp(&other.rule_id))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.severity.cmp(&other.severity))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for Violation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Render a relative path with `/` separators.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
