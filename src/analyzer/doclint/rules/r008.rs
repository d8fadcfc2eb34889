//! R008: deploy-manager-label
//!
//! App workloads must carry the deploy-manager label, equal to `metadata.name`.

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract::{self, DEPLOY_MANAGER_LABEL};
use crate::analyzer::doclint::rules::{Rule, SimpleRule, doc_violation};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R008";
const NAME: &str = "deploy-manager-label";
const DESCRIPTION: &str = "App workloads must label cloud.sealos.io/app-deploy-manager with metadata.name.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    for doc in ctx.checked_documents() {
        if !extract::is_app_workload(&doc.value) {
            continue;
        }
        let Some(name) = doc.name() else {
            continue;
        };

        let label = extract::get_path(&doc.value, &["metadata", "labels", DEPLOY_MANAGER_LABEL]);
        if extract::is_missing(label) {
            violations.push(doc_violation(
                CODE,
                doc,
                r"^\s*labels\s*:",
                Some(r"^\s*metadata\s*:"),
                format!("{} label is required and must exactly match metadata.name", DEPLOY_MANAGER_LABEL),
            ));
        } else if label.and_then(|v| v.as_str()) != Some(name) {
            violations.push(doc_violation(
                CODE,
                doc,
                &regex::escape(DEPLOY_MANAGER_LABEL),
                None,
                format!("{} must exactly match metadata.name", DEPLOY_MANAGER_LABEL),
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::doclint::rules::test_support::yaml_context;

    fn deployment(labels: &str) -> String {
        format!(
            "kind: Deployment\nmetadata:\n  name: web\n{}spec:\n  template:\n    spec:\n      containers:\n        - name: web\n",
            labels
        )
    }

    #[test]
    fn test_missing_label() {
        let violations = check(&yaml_context(&deployment("")));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
        assert!(violations[0].message.contains("is required"));

        let violations = check(&yaml_context(&deployment("  labels:\n    app: web\n")));
        assert_eq!(violations[0].line, 4);
    }

    #[test]
    fn test_mismatched_label() {
        let yaml = deployment("  labels:\n    cloud.sealos.io/app-deploy-manager: api\n");
        let violations = check(&yaml_context(&yaml));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 5);
        assert_eq!(
            violations[0].message,
            "cloud.sealos.io/app-deploy-manager must exactly match metadata.name"
        );
    }

    #[test]
    fn test_matching_label_and_non_workloads() {
        let yaml = deployment("  labels:\n    cloud.sealos.io/app-deploy-manager: web\n");
        assert!(check(&yaml_context(&yaml)).is_empty());
        assert!(check(&yaml_context("kind: Service\nmetadata:\n  name: web\n")).is_empty());
    }
}
