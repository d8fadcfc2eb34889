//! R029: service-identity
//!
//! A template artifact Service selects its app by name: `metadata.name`,
//! `labels.app` and the deploy-manager label must all equal
//! `spec.selector.app`.

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract::{self, DEPLOY_MANAGER_LABEL, LabelMatch};
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R029";
const NAME: &str = "service-identity";
const DESCRIPTION: &str = "Template artifact Service names and labels must equal spec.selector.app.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let cloud_label_pattern = regex::escape(DEPLOY_MANAGER_LABEL);

    for doc in ctx.template_artifacts("Service") {
        let Some(selector) =
            extract::trimmed_str(extract::get_path(&doc.value, &["spec", "selector", "app"]))
        else {
            continue;
        };

        let Some(name) = doc.name().map(str::trim).filter(|n| !n.is_empty()) else {
            violations.push(doc_violation(
                CODE,
                doc,
                r"^\s*name\s*:",
                Some(r"^\s*metadata\s*:"),
                "Service metadata.name is required and must match spec.selector.app",
            ));
            continue;
        };

        if name != selector {
            violations.push(doc_violation(
                CODE,
                doc,
                r"^\s*name\s*:",
                Some(r"^\s*metadata\s*:"),
                "Service metadata.name must match spec.selector.app",
            ));
        }

        match extract::compare_label(&doc.value, "app", name) {
            LabelMatch::Missing => violations.push(doc_violation(
                CODE,
                doc,
                r"^\s*labels\s*:",
                Some(r"^\s*metadata\s*:"),
                "Service metadata.labels.app is required and must match metadata.name/spec.selector.app",
            )),
            LabelMatch::Mismatch => violations.push(doc_violation(
                CODE,
                doc,
                r"^\s*app\s*:",
                Some(r"^\s*labels\s*:"),
                "Service metadata.labels.app must match metadata.name/spec.selector.app",
            )),
            LabelMatch::Match => {}
        }

        match extract::compare_label(&doc.value, DEPLOY_MANAGER_LABEL, name) {
            LabelMatch::Missing => violations.push(doc_violation(
                CODE,
                doc,
                &cloud_label_pattern,
                Some(r"^\s*labels\s*:"),
                "Service metadata.labels.cloud.sealos.io/app-deploy-manager is required and must match metadata.name/spec.selector.app",
            )),
            LabelMatch::Mismatch => violations.push(doc_violation(
                CODE,
                doc,
                &cloud_label_pattern,
                Some(r"^\s*labels\s*:"),
                "Service metadata.labels.cloud.sealos.io/app-deploy-manager must match metadata.name/spec.selector.app",
            )),
            LabelMatch::Match => {}
        }
    }

    violations
}
