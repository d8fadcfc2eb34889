//! R031: ingress-identity
//!
//! A template artifact Ingress is named after the app it exposes: the
//! deploy-manager label and every backend service name must equal
//! `metadata.name`.

use serde_yaml::Value;

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract::{self, DEPLOY_MANAGER_LABEL, LabelMatch};
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R031";
const NAME: &str = "ingress-identity";
const DESCRIPTION: &str = "Template artifact Ingress labels and backends must equal metadata.name.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let cloud_label_pattern = regex::escape(DEPLOY_MANAGER_LABEL);

    for doc in ctx.template_artifacts("Ingress") {
        let Some(name) = doc.name().map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };

        let label_message = match extract::compare_label(&doc.value, DEPLOY_MANAGER_LABEL, name) {
            LabelMatch::Missing => Some(
                "Ingress metadata.labels.cloud.sealos.io/app-deploy-manager is required and must match metadata.name",
            ),
            LabelMatch::Mismatch => {
                Some("Ingress metadata.labels.cloud.sealos.io/app-deploy-manager must match metadata.name")
            }
            LabelMatch::Match => None,
        };
        if let Some(message) = label_message {
            violations.push(doc_violation(
                CODE,
                doc,
                &cloud_label_pattern,
                Some(r"^\s*labels\s*:"),
                message,
            ));
        }

        // One finding per Ingress, however many backends disagree.
        if backend_service_names(&doc.value).any(|backend| backend != name) {
            violations.push(doc_violation(
                CODE,
                doc,
                r"^\s*name\s*:",
                Some(r"^\s*service\s*:"),
                "Ingress backend service.name must match Ingress metadata.name",
            ));
        }
    }

    violations
}

/// `spec.rules[].http.paths[].backend.service.name`, trimmed and non-empty.
fn backend_service_names(value: &Value) -> impl Iterator<Item = &str> {
    extract::get_path(value, &["spec", "rules"])
        .and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(|rule| extract::get_path(rule, &["http", "paths"])?.as_sequence())
        .flatten()
        .filter_map(|path| {
            extract::trimmed_str(extract::get_path(path, &["backend", "service", "name"]))
        })
}
