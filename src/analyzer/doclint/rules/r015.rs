//! R015: origin-image-match
//!
//! Managed workloads in standalone YAML files must record the image they
//! were generated from in `originImageName`, and it must be one of the
//! workload's container images.

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract::{self, ImageField, ORIGIN_IMAGE_ANNOTATION};
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R015";
const NAME: &str = "origin-image-match";
const DESCRIPTION: &str = "originImageName must be set and match a container image.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    for doc in ctx.checked_documents() {
        if !doc.is_yaml_file() || !extract::is_managed_app_workload(&doc.value) {
            continue;
        }

        let references = extract::image_references(&doc.value);
        let images: Vec<&str> = references
            .iter()
            .filter(|(field, _)| *field == ImageField::Container)
            .map(|(_, image)| *image)
            .collect();
        if images.is_empty() {
            continue;
        }

        let origin = extract::annotation(&doc.value, ORIGIN_IMAGE_ANNOTATION)
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let message = match origin {
            None => "managed app workloads must define metadata.annotations.originImageName",
            Some(origin) if !images.contains(&origin) => {
                "metadata.annotations.originImageName must match a container image in the workload"
            }
            Some(_) => continue,
        };
        violations.push(doc_violation(
            CODE,
            doc,
            "originImageName",
            Some(r"^\s*metadata\s*:"),
            message,
        ));
    }

    violations
}
