//! R020: named-service-ports
//!
//! Service ports in rendered template artifacts must be named.

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation, key_value_pattern};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R020";
const NAME: &str = "named-service-ports";
const DESCRIPTION: &str = "Template artifact Service ports must define a non-empty name.";

const PORTS_PATTERN: &str = r"^\s*ports\s*:";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    for doc in ctx.template_artifacts("Service") {
        let Some(ports) = extract::get_path(&doc.value, &["spec", "ports"]).and_then(|v| v.as_sequence())
        else {
            continue;
        };

        for entry in ports.iter().filter_map(|p| p.as_mapping()) {
            if extract::trimmed_str(entry.get("name")).is_some() {
                continue;
            }
            let pattern = entry
                .get("port")
                .and_then(extract::scalar_text)
                .map(|port| key_value_pattern("port", &port))
                .unwrap_or_else(|| PORTS_PATTERN.to_string());
            violations.push(doc_violation(
                CODE,
                doc,
                &pattern,
                Some(PORTS_PATTERN),
                "Service spec.ports entries must define a non-empty name",
            ));
        }
    }

    violations
}
