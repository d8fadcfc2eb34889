//! R032: service-selector-target
//!
//! Cross-document check: a Service's `spec.selector.app` must name an app
//! workload declared in the same file. Files without any app workload are
//! not judged, since the target may live elsewhere.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R032";
const NAME: &str = "service-selector-target";
const DESCRIPTION: &str = "Service selectors must match an app workload declared in the same file.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut workloads: HashMap<&Path, HashSet<&str>> = HashMap::new();
    for doc in ctx.checked_documents() {
        if !extract::is_app_workload(&doc.value) {
            continue;
        }
        if let Some(name) = doc.name().map(str::trim).filter(|n| !n.is_empty()) {
            workloads.entry(doc.path.as_path()).or_default().insert(name);
        }
    }

    let mut violations = Vec::new();
    for doc in ctx.documents_of_kind("Service") {
        let Some(selector) =
            extract::trimmed_str(extract::get_path(&doc.value, &["spec", "selector", "app"]))
        else {
            continue;
        };
        let Some(names) = workloads.get(doc.path.as_path()) else {
            continue;
        };
        if names.contains(selector) {
            continue;
        }
        violations.push(doc_violation(
            CODE,
            doc,
            r"^\s*selector\s*:",
            Some(r"^\s*spec\s*:"),
            format!(
                "Service selector app '{}' does not match any workload declared in the same file",
                selector
            ),
        ));
    }

    violations
}
