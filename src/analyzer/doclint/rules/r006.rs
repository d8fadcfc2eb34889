//! R006: image-pull-policy
//!
//! Every container (including init containers) that declares an image must
//! set `imagePullPolicy: IfNotPresent` explicitly.

use crate::analyzer::doclint::context::{ParsedDocument, ScanContext};
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{Rule, SimpleRule, key_value_pattern};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R006";
const NAME: &str = "image-pull-policy";
const DESCRIPTION: &str = "Containers must set imagePullPolicy: IfNotPresent.";

const REQUIRED_POLICY: &str = "IfNotPresent";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    for doc in ctx.checked_documents() {
        for container in extract::all_containers(&doc.value) {
            let Some(image) = extract::container_str(container, "image") else {
                continue;
            };
            let policy = container.get("imagePullPolicy");
            if policy.and_then(|p| p.as_str()) == Some(REQUIRED_POLICY) {
                continue;
            }

            let message = if extract::is_missing(policy) {
                "container must explicitly set imagePullPolicy: IfNotPresent"
            } else {
                "container imagePullPolicy must be IfNotPresent"
            };
            let line = policy_line(doc, image, !extract::is_missing(policy));
            violations.push(Violation::new(CODE, doc.path.clone(), line, message));
        }
    }

    violations
}

/// A wrong policy points at the first `imagePullPolicy` line; a missing one
/// points at the container's own image line.
fn policy_line(doc: &ParsedDocument, image: &str, has_policy: bool) -> u32 {
    let image_line = doc.find_line(
        &key_value_pattern("image", image),
        Some(doc.find_line(r"^\s*image\s*:", None)),
    );
    if has_policy {
        doc.find_line(r"^\s*imagePullPolicy\s*:", Some(image_line))
    } else {
        image_line
    }
}
