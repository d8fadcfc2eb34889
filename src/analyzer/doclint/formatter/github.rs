//! GitHub Actions output formatter for doclint.
//!
//! Produces output in GitHub Actions workflow command format:
//! ::error file={name},line={line},title={rule}::[{rule}] {message}

use crate::analyzer::doclint::lint::LintResult;
use crate::analyzer::doclint::types::Severity;

/// Format a result for GitHub Actions.
pub fn format(result: &LintResult) -> String {
    let mut output = String::new();

    for violation in &result.violations {
        let level = match violation.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        output.push_str(&format!(
            "::{} file={},line={},title={}::[{}] {}\n",
            level,
            violation.display_path(&result.scan_root),
            violation.line,
            violation.rule_id,
            violation.rule_id,
            escape_github(&violation.message)
        ));
    }

    output
}

/// Escape special characters for GitHub Actions.
fn escape_github(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
