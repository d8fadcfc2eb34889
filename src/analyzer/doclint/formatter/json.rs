//! JSON output formatter for doclint.

use serde_json::json;

use crate::analyzer::doclint::lint::LintResult;

/// Format a result as JSON.
pub fn format(result: &LintResult) -> String {
    let violations: Vec<serde_json::Value> = result
        .violations
        .iter()
        .map(|v| {
            json!({
                "ruleId": v.rule_id.as_str(),
                "severity": v.severity.as_str(),
                "path": v.path.display().to_string(),
                "relativePath": v.display_path(&result.scan_root),
                "line": v.line,
                "message": v.message,
            })
        })
        .collect();

    let output = json!({
        "violations": violations,
        "summary": result.summary,
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
