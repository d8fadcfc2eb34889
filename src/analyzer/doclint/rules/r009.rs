//! R009: revision-history-limit
//!
//! Managed workloads keep a single old ReplicaSet: `spec.revisionHistoryLimit: 1`.

use serde_yaml::Value;

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{ManagedSetting, Rule, SimpleRule, check_managed_setting};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R009";
const NAME: &str = "revision-history-limit";
const DESCRIPTION: &str = "Managed app workloads must set spec.revisionHistoryLimit to 1.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    check_managed_setting(
        ctx,
        &ManagedSetting {
            code: CODE,
            extract: revision_history_limit,
            expected: |value| value.as_i64() == Some(1),
            value_pattern: r"^\s*revisionHistoryLimit\s*:",
            fallback_pattern: r"^\s*spec\s*:",
            missing_message: "managed app workloads must explicitly set revisionHistoryLimit: 1",
            mismatch_message: "revisionHistoryLimit must be set to 1 for managed app workloads",
        },
    )
}

fn revision_history_limit(value: &Value) -> Option<&Value> {
    extract::get_path(value, &["spec", "revisionHistoryLimit"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::doclint::rules::test_support::yaml_context;

    fn managed(spec_extra: &str) -> String {
        format!(
            r#"kind: Deployment
metadata:
  name: web
  labels:
    cloud.sealos.io/app-deploy-manager: web
spec:
{}  template:
    spec:
      containers:
        - name: web
"#,
            spec_extra
        )
    }

    #[test]
    fn test_missing() {
        let violations = check(&yaml_context(&managed("")));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 6);
        assert_eq!(
            violations[0].message,
            "managed app workloads must explicitly set revisionHistoryLimit: 1"
        );
    }

    #[test]
    fn test_mismatch() {
        let violations = check(&yaml_context(&managed("  revisionHistoryLimit: 10\n")));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 7);
        assert!(violations[0].message.starts_with("revisionHistoryLimit must be set to 1"));

        assert_eq!(check(&yaml_context(&managed("  revisionHistoryLimit: '1'\n"))).len(), 1);
    }

    #[test]
    fn test_compliant_and_unmanaged() {
        assert!(check(&yaml_context(&managed("  revisionHistoryLimit: 1\n"))).is_empty());
        let unmanaged = managed("").replace("  labels:\n    cloud.sealos.io/app-deploy-manager: web\n", "");
        assert!(check(&yaml_context(&unmanaged)).is_empty());
    }
}
