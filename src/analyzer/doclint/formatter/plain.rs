//! Plain text output formatter for doclint.
//!
//! ```text
//! Consistency check failed with the following issues:
//! - [R001/error] /work/skill/SKILL.md:12: forbidden ':latest' image tag
//! ```

use colored::Colorize;

use crate::analyzer::doclint::lint::LintResult;
use crate::analyzer::doclint::types::{Severity, Violation};

/// Header printed above the violation list.
pub const FAILURE_HEADER: &str = "Consistency check failed with the following issues:";

/// Format a result as a plain report.
pub fn format(result: &LintResult, color: bool) -> String {
    if result.violations.is_empty() {
        let line = format!("Consistency check passed ({} rules).", result.summary.rules_run);
        return if color {
            format!("{}\n", line.green())
        } else {
            format!("{}\n", line)
        };
    }

    let mut output = String::new();
    output.push_str(FAILURE_HEADER);
    output.push('\n');
    for violation in &result.violations {
        output.push_str(&format_violation(violation, color));
        output.push('\n');
    }
    output
}

/// `- [RULE/severity] path:line: message`
pub fn format_violation(violation: &Violation, color: bool) -> String {
    let tag = format!("[{}/{}]", violation.rule_id, violation.severity);
    let tag = if color {
        match violation.severity {
            Severity::Error => tag.red().bold().to_string(),
            Severity::Warning => tag.yellow().bold().to_string(),
        }
    } else {
        tag
    };
    format!(
        "- {} {}:{}: {}",
        tag,
        violation.path.display(),
        violation.line,
        violation.message
    )
}
