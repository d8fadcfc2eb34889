//! R027: app-label
//!
//! Managed workloads must carry `metadata.labels.app` equal to `metadata.name`.

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R027";
const NAME: &str = "app-label";
const DESCRIPTION: &str = "Managed app workloads must label app with metadata.name.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    for doc in ctx.checked_documents() {
        if !extract::is_managed_app_workload(&doc.value) {
            continue;
        }
        let Some(name) = doc.name().filter(|n| !n.trim().is_empty()) else {
            continue;
        };

        let message = match extract::label(&doc.value, "app").filter(|v| !v.trim().is_empty()) {
            None => {
                "metadata.labels.app is required and must exactly match metadata.name for managed app workloads"
            }
            Some(value) if value != name => {
                "metadata.labels.app must exactly match metadata.name for managed app workloads"
            }
            Some(_) => continue,
        };
        violations.push(doc_violation(
            CODE,
            doc,
            r"^\s*app\s*:",
            Some(r"^\s*metadata\s*:"),
            message,
        ));
    }

    violations
}
