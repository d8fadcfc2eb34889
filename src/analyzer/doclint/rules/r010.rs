//! R010: no-service-account-token
//!
//! Managed workloads must opt out of mounting the service account token.

use serde_yaml::Value;

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{ManagedSetting, Rule, SimpleRule, check_managed_setting};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R010";
const NAME: &str = "no-service-account-token";
const DESCRIPTION: &str = "Managed app workloads must set automountServiceAccountToken: false.";

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    check_managed_setting(
        ctx,
        &ManagedSetting {
            code: CODE,
            extract: automount_token,
            expected: |value| value.as_bool() == Some(false),
            value_pattern: r"^\s*automountServiceAccountToken\s*:",
            fallback_pattern: r"^\s*template\s*:",
            missing_message: "managed app workloads must explicitly set automountServiceAccountToken: false",
            mismatch_message: "automountServiceAccountToken must be false for managed app workloads",
        },
    )
}

fn automount_token(value: &Value) -> Option<&Value> {
    extract::get(extract::template_spec(value)?, "automountServiceAccountToken")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::doclint::rules::test_support::yaml_context;

    fn managed(pod_extra: &str) -> String {
        format!(
            r#"kind: StatefulSet
metadata:
  name: db
  annotations:
    originImageName: postgres:16.2
spec:
  template:
    spec:
{}      containers:
        - name: db
"#,
            pod_extra
        )
    }

    #[test]
    fn test_missing_points_at_template() {
        let violations = check(&yaml_context(&managed("")));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 7);
        assert!(violations[0].message.contains("must explicitly set"));
    }

    #[test]
    fn test_true_is_mismatch() {
        let violations = check(&yaml_context(&managed("      automountServiceAccountToken: true\n")));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 9);
        assert_eq!(
            violations[0].message,
            "automountServiceAccountToken must be false for managed app workloads"
        );
    }

    #[test]
    fn test_false_is_compliant() {
        let yaml = managed("      automountServiceAccountToken: false\n");
        assert!(check(&yaml_context(&yaml)).is_empty());
    }
}
