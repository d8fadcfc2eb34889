//! R005: no-empty-dir
//!
//! `emptyDir` volumes lose data on restart; workloads must use persistent storage.

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R005";
const NAME: &str = "no-empty-dir";
const DESCRIPTION: &str = "Volumes must not use emptyDir.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    ctx.checked_documents()
        .filter(|doc| extract::contains_key(&doc.value, "emptyDir"))
        .map(|doc| {
            doc_violation(
                CODE,
                doc,
                r"^\s*emptyDir\s*:",
                None,
                "emptyDir is not allowed; use persistent storage",
            )
        })
        .collect()
}
