//! Output formatters for doclint results.
//!
//! - Plain - Human-readable report (default)
//! - JSON - Machine-readable JSON output
//! - GitHub - GitHub Actions annotations

pub mod github;
pub mod json;
pub mod plain;

use crate::analyzer::doclint::lint::LintResult;

/// Output format for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable report (default)
    #[default]
    Plain,
    /// JSON format for machine processing
    Json,
    /// GitHub Actions annotations
    GitHub,
}

impl OutputFormat {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Some(Self::Plain),
            "json" => Some(Self::Json),
            "github" | "github-actions" => Some(Self::GitHub),
            _ => None,
        }
    }
}

/// Format a result according to the specified format.
///
/// `color` only affects the plain format.
pub fn format_result(result: &LintResult, format: OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Plain => plain::format(result, color),
        OutputFormat::Json => json::format(result),
        OutputFormat::GitHub => github::format(result),
    }
}
