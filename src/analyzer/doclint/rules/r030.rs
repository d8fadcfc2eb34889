//! R030: configmap-identity
//!
//! Template artifact ConfigMaps carry `app` and deploy-manager labels equal
//! to their own name.

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract::{self, DEPLOY_MANAGER_LABEL, LabelMatch};
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R030";
const NAME: &str = "configmap-identity";
const DESCRIPTION: &str = "Template artifact ConfigMap labels must equal metadata.name.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let cloud_label_pattern = regex::escape(DEPLOY_MANAGER_LABEL);

    for doc in ctx.template_artifacts("ConfigMap") {
        let Some(name) = doc.name().map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };

        match extract::compare_label(&doc.value, "app", name) {
            LabelMatch::Missing => violations.push(doc_violation(
                CODE,
                doc,
                r"^\s*labels\s*:",
                Some(r"^\s*metadata\s*:"),
                "ConfigMap metadata.labels.app is required and must match metadata.name",
            )),
            LabelMatch::Mismatch => violations.push(doc_violation(
                CODE,
                doc,
                r"^\s*app\s*:",
                Some(r"^\s*labels\s*:"),
                "ConfigMap metadata.labels.app must match metadata.name",
            )),
            LabelMatch::Match => {}
        }

        match extract::compare_label(&doc.value, DEPLOY_MANAGER_LABEL, name) {
            LabelMatch::Missing => violations.push(doc_violation(
                CODE,
                doc,
                &cloud_label_pattern,
                Some(r"^\s*labels\s*:"),
                "ConfigMap metadata.labels.cloud.sealos.io/app-deploy-manager is required and must match metadata.name",
            )),
            LabelMatch::Mismatch => violations.push(doc_violation(
                CODE,
                doc,
                &cloud_label_pattern,
                Some(r"^\s*labels\s*:"),
                "ConfigMap metadata.labels.cloud.sealos.io/app-deploy-manager must match metadata.name",
            )),
            LabelMatch::Match => {}
        }
    }

    violations
}
