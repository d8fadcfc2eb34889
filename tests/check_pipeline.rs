//! End-to-end tests for the check pipeline over real files.

use std::fs;
use std::path::{Path, PathBuf};

use manifest_lint::ConfigError;
use manifest_lint::analyzer::doclint::rules::{Rule, RuleSet, r001};
use manifest_lint::analyzer::doclint::{CheckRequest, Severity, lint, lint_with, run_checks};
use tempfile::TempDir;

const SHIPPED_REGISTRY: &str = include_str!("../registry/rules-registry.yaml");

const LATEST_DEPLOYMENT: &str = "# Skill

```yaml
kind: Deployment
spec:
  template:
    spec:
      containers:
        - name: a
          image: nginx:latest
```
";

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// Skill directory with the shipped registry, canonicalized so reported
/// paths compare equal.
fn skill_dir(skill: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    write(&root, "SKILL.md", skill);
    write(&root, "references/rules-registry.yaml", SHIPPED_REGISTRY);
    (dir, root)
}

#[test]
fn test_single_rule_reports_image_line() {
    let dir = TempDir::new().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    write(&root, "SKILL.md", LATEST_DEPLOYMENT);
    write(
        &root,
        "references/rules-registry.yaml",
        "version: 1\nrules:\n  - id: R001\n    description: no latest\n",
    );

    let rules = RuleSet::compose([vec![Box::new(r001::rule()) as Box<dyn Rule>]]).unwrap();
    let result = lint_with(&CheckRequest::new(root.join("SKILL.md")), rules).unwrap();

    assert_eq!(result.violations.len(), 1);
    let v = &result.violations[0];
    assert_eq!(v.rule_id.as_str(), "R001");
    assert_eq!(v.line, 10);
    assert_eq!(v.path, root.join("SKILL.md"));
}

#[test]
fn test_builtin_rules_sorted_report() {
    let (_dir, root) = skill_dir(LATEST_DEPLOYMENT);
    let violations = run_checks(&CheckRequest::new(root.join("SKILL.md"))).unwrap();

    let summary: Vec<(&str, u32)> = violations.iter().map(|v| (v.rule_id.as_str(), v.line)).collect();
    assert_eq!(summary, vec![("R001", 10), ("R006", 10)]);
    assert_eq!(
        violations[1].message,
        "container must explicitly set imagePullPolicy: IfNotPresent"
    );
}

#[test]
fn test_clean_skill_passes() {
    let skill = "# Skill\n\n```yaml\nkind: ConfigMap\nmetadata:\n  name: app\ndata:\n  key: value\n```\n";
    let (_dir, root) = skill_dir(skill);

    let result = lint(&CheckRequest::new(root.join("SKILL.md"))).unwrap();
    assert!(!result.has_failures());
    assert_eq!(result.summary.rules_run, 17);
    // The registry under references/ is scanned as well.
    assert_eq!(result.summary.documents, 2);
}

#[test]
fn test_negative_example_is_not_checked() {
    let skill = format!("# Skill\n\n❌ Wrong example:\n{}", &LATEST_DEPLOYMENT["# Skill\n\n".len()..]);
    let (_dir, root) = skill_dir(&skill);

    let result = lint(&CheckRequest::new(root.join("SKILL.md"))).unwrap();
    assert!(result.violations.is_empty());
    assert_eq!(result.summary.documents, 2);
}

#[test]
fn test_reference_files_are_scanned() {
    let (_dir, root) = skill_dir("# Skill\n");
    write(
        &root,
        "references/storage.md",
        "# Storage\n\n```yml\nvolumes:\n  - name: cache\n    emptyDir: {}\n```\n",
    );

    let violations = run_checks(&CheckRequest::new(root.join("SKILL.md"))).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule_id.as_str(), "R005");
    assert_eq!(violations[0].path, root.join("references/storage.md"));
    assert_eq!(violations[0].line, 6);
}

#[test]
fn test_malformed_yaml_reported_as_parse_failure() {
    let (_dir, root) = skill_dir("# Skill\n\n```yaml\nkind: [Deployment\n```\n");

    let violations = run_checks(&CheckRequest::new(root.join("SKILL.md"))).unwrap();
    assert_eq!(violations.len(), 1);
    assert!(violations[0].rule_id.is_parse_failure());
    assert_eq!(violations[0].severity, Severity::Error);
    assert!(violations[0].message.starts_with("invalid YAML snippet:"));
}

#[test]
fn test_registry_severity_and_scope_apply() {
    let skill = "# Skill\n\n```yaml\nvolumes:\n  - emptyDir: {}\n```\n";
    let (_dir, root) = skill_dir(skill);
    let registry = SHIPPED_REGISTRY.replace(
        "  - id: R005\n    description: Volumes must not use emptyDir.\n    severity: error\n",
        "  - id: R005\n    description: Volumes must not use emptyDir.\n    severity: warning\n    scope:\n      include_paths: [\"SKILL.md\"]\n",
    );
    write(&root, "references/rules-registry.yaml", &registry);
    write(&root, "references/extra.yaml", "volumes:\n  - emptyDir: {}\n");

    let violations = run_checks(&CheckRequest::new(root.join("SKILL.md"))).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, root.join("SKILL.md"));
    assert_eq!(violations[0].severity, Severity::Warning);
}

#[test]
fn test_template_artifacts_via_include_paths() {
    let (_dir, root) = skill_dir("# Skill\n");
    write(
        &root,
        "template/app/index.yaml",
        "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n  labels:\n    app: web\n    cloud.sealos.io/app-deploy-manager: web\nspec:\n  selector:\n    app: web\n  ports:\n    - port: 80\n",
    );

    let request = CheckRequest::new(root.join("SKILL.md")).with_include_paths(["template"]);
    let violations = run_checks(&request).unwrap();
    let ids: Vec<&str> = violations.iter().map(|v| v.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["R020"]);
    assert_eq!(violations[0].line, 12);
}

#[test]
fn test_configuration_errors() {
    let (_dir, root) = skill_dir("# Skill\n");

    let request = CheckRequest::new(root.join("SKILL.md")).with_include_paths(["missing"]);
    assert!(matches!(lint(&request), Err(ConfigError::IncludeNotFound(_))));

    write(&root, "notes.txt", "hello\n");
    let request = CheckRequest::new(root.join("SKILL.md")).with_include_paths(["notes.txt"]);
    assert!(matches!(lint(&request), Err(ConfigError::UnsupportedInclude(_))));

    let request = CheckRequest::new(root.join("SKILL.md")).with_only(["R001", "R404"]);
    assert!(matches!(lint(&request), Err(ConfigError::UnknownRules(ref ids)) if ids == &["R404".to_string()]));

    write(&root, "references/rules-registry.yaml", "rules: nope\n");
    assert!(matches!(lint(&CheckRequest::new(root.join("SKILL.md"))), Err(ConfigError::Registry { .. })));
}
