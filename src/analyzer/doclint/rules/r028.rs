//! R028: container-name
//!
//! Every regular container of a managed workload is named after the workload.

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R028";
const NAME: &str = "container-name";
const DESCRIPTION: &str = "Managed app workload container names must equal metadata.name.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    for doc in ctx.checked_documents() {
        if !extract::is_managed_app_workload(&doc.value) {
            continue;
        }
        let Some(workload) = doc.name().filter(|n| !n.trim().is_empty()) else {
            continue;
        };

        for container in extract::containers(&doc.value) {
            let (pattern, message) = match extract::container_str(container, "name") {
                Some(name) if name == workload => continue,
                Some(name) => (
                    format!(r"^\s*-\s*name\s*:\s*{}\s*$", regex::escape(name)),
                    format!(
                        "container name '{}' must exactly match metadata.name '{}' for managed app workloads",
                        name, workload
                    ),
                ),
                None => (
                    r"^\s*-\s*name\s*:".to_string(),
                    "container name is required and must exactly match metadata.name for managed app workloads"
                        .to_string(),
                ),
            };
            violations.push(doc_violation(
                CODE,
                doc,
                &pattern,
                Some(r"^\s*containers\s*:"),
                message,
            ));
        }
    }

    violations
}
