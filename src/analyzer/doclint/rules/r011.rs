//! R011: pvc-storage-limit
//!
//! PersistentVolumeClaim and `volumeClaimTemplates` storage requests must be
//! concrete quantities no larger than 1Gi.

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract::{self, MAX_PVC_STORAGE_BYTES};
use crate::analyzer::doclint::rules::{Rule, SimpleRule, key_value_pattern};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R011";
const NAME: &str = "pvc-storage-limit";
const DESCRIPTION: &str = "PVC storage requests must be concrete and at most 1Gi.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    for doc in ctx.checked_documents() {
        for raw in extract::pvc_storage_values(&doc.value) {
            let text = raw.trim();
            let line = doc.find_line(
                &key_value_pattern("storage", text),
                Some(doc.find_line(r"^\s*storage\s*:", None)),
            );

            let message = if extract::has_variable_expression(text) {
                "PVC storage must be a concrete quantity (variables are not allowed)".to_string()
            } else {
                match extract::parse_storage_bytes(text) {
                    None => format!("unable to parse PVC storage quantity: '{}'", text),
                    Some(bytes) if bytes > MAX_PVC_STORAGE_BYTES => {
                        "PVC storage request must be <= 1Gi".to_string()
                    }
                    Some(_) => continue,
                }
            };
            violations.push(Violation::new(CODE, doc.path.clone(), line, message));
        }
    }

    violations
}
