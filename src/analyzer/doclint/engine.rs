//! Rule engine: selects rules, runs them and post-processes their findings.
//!
//! Post-processing resolves each finding's metadata through the finding's
//! own rule ID (falling back to the rule that emitted it), drops findings
//! outside that rule's path scope, stamps the registry severity and sorts
//! the merged list.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::registry::{RegistryConfig, RuleDescriptor};
use crate::analyzer::doclint::rules::RuleSet;
use crate::analyzer::doclint::types::{Violation, to_slash};
use crate::error::{ConfigError, Result};

/// Runs registered rules against a scan context.
#[derive(Debug)]
pub struct RuleEngine {
    registry: RegistryConfig,
    rules: RuleSet,
    scan_root: PathBuf,
}

impl RuleEngine {
    /// Create an engine. The registry must declare exactly the implemented rules.
    pub fn new(registry: RegistryConfig, rules: RuleSet, scan_root: impl Into<PathBuf>) -> Result<Self> {
        registry.validate_against(rules.ids())?;
        Ok(Self {
            registry,
            rules,
            scan_root: scan_root.into(),
        })
    }

    /// The registry the engine was built with.
    pub fn registry(&self) -> &RegistryConfig {
        &self.registry
    }

    /// Rule IDs to run: `only` as given, or every declared rule in
    /// registry order.
    pub fn resolve_rules(&self, only: &[String]) -> Result<Vec<String>> {
        if only.is_empty() {
            return Ok(self.registry.ordered_ids().to_vec());
        }

        let mut unknown: Vec<String> = only
            .iter()
            .filter(|id| self.rules.get(id).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            unknown.dedup();
            return Err(ConfigError::UnknownRules(unknown));
        }
        Ok(only.to_vec())
    }

    /// Run the selected rules and merge their findings with the parse-time
    /// violations. The result is sorted.
    pub fn run(
        &self,
        context: &ScanContext,
        parse_violations: Vec<Violation>,
        selected: &[String],
    ) -> Vec<Violation> {
        // Each rule reads the shared context, so rules run in parallel;
        // `collect` keeps selection order.
        let per_rule: Vec<Vec<Violation>> = selected
            .par_iter()
            .map(|id| self.run_rule(id, context))
            .collect();

        let mut violations = parse_violations;
        violations.extend(per_rule.into_iter().flatten());
        violations.sort();

        info!(
            "ran {} rule(s) over {} document(s): {} violation(s)",
            selected.len(),
            context.documents().len(),
            violations.len()
        );
        violations
    }

    fn run_rule(&self, id: &str, context: &ScanContext) -> Vec<Violation> {
        let (Some(rule), Some(default_meta)) = (self.rules.get(id), self.registry.rule(id)) else {
            return Vec::new();
        };

        let found = rule.check(context);
        debug!("{} ({}) reported {} finding(s)", id, rule.name(), found.len());

        found
            .into_iter()
            .filter_map(|item| {
                let meta = self.registry.rule(item.rule_id.as_str()).unwrap_or(default_meta);
                if !self.in_scope(&item, meta) {
                    return None;
                }
                let severity = meta.severity;
                Some(item.with_severity(severity))
            })
            .collect()
    }

    fn in_scope(&self, violation: &Violation, meta: &RuleDescriptor) -> bool {
        meta.include_paths.is_empty() || meta.in_scope(&self.relative_path(&violation.path))
    }

    /// Path relative to the scan root with `/` separators, or the path
    /// itself when it lies outside the root.
    fn relative_path(&self, path: &Path) -> String {
        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let root = fs::canonicalize(&self.scan_root).unwrap_or_else(|_| self.scan_root.clone());
        match resolved.strip_prefix(&root) {
            Ok(rel) => to_slash(rel),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::doclint::context::ContextBuild;
    use crate::analyzer::doclint::rules::{Rule, SimpleRule};
    use crate::analyzer::doclint::types::Severity;

    /// Flags every document, reporting under `R100` and `R200`.
    fn emitting_rule() -> impl Rule {
        SimpleRule::new("R100", "emit", "test rule", |ctx: &ScanContext| {
            ctx.documents()
                .iter()
                .flat_map(|doc| {
                    [
                        Violation::new("R100", doc.path.clone(), doc.start_line, "own"),
                        Violation::new("R200", doc.path.clone(), doc.start_line, "foreign"),
                    ]
                })
                .collect()
        })
    }

    fn quiet_rule() -> impl Rule {
        SimpleRule::new("R200", "quiet", "test rule", |_: &ScanContext| Vec::new())
    }

    fn rule_set() -> RuleSet {
        RuleSet::compose([vec![
            Box::new(emitting_rule()) as Box<dyn Rule>,
            Box::new(quiet_rule()),
        ]])
        .unwrap()
    }

    fn registry(r200_scope: &[&str]) -> RegistryConfig {
        let mut r200 = RuleDescriptor::new("R200", "quiet", Severity::Warning);
        r200.include_paths = r200_scope.iter().map(|p| glob::Pattern::new(p).unwrap()).collect();
        RegistryConfig::from_descriptors([RuleDescriptor::new("R100", "emit", Severity::Error), r200]).unwrap()
    }

    fn context() -> ContextBuild {
        ContextBuild::from_texts([
            ("/skill/references/b.yaml", "kind: ConfigMap\n"),
            ("/skill/SKILL.md", "```yaml\nkind: Service\n```\n"),
        ])
    }

    #[test]
    fn test_symmetry_checked_on_construction() {
        let partial = RegistryConfig::from_descriptors([RuleDescriptor::new("R100", "emit", Severity::Error)]).unwrap();
        let err = RuleEngine::new(partial, rule_set(), "/skill").unwrap_err();
        assert!(matches!(err, ConfigError::RuleSetMismatch { .. }));
    }

    #[test]
    fn test_resolve_rules() {
        let engine = RuleEngine::new(registry(&[]), rule_set(), "/skill").unwrap();
        assert_eq!(engine.resolve_rules(&[]).unwrap(), vec!["R100", "R200"]);
        assert_eq!(engine.resolve_rules(&["R200".to_string()]).unwrap(), vec!["R200"]);

        let err = engine
            .resolve_rules(&["R9".to_string(), "R100".to_string(), "R3".to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown rule id(s): R3, R9");
    }

    #[test]
    fn test_foreign_ids_use_their_own_metadata() {
        let engine = RuleEngine::new(registry(&[]), rule_set(), "/skill").unwrap();
        let build = context();
        let violations = engine.run(&build.context, build.parse_violations, &["R100".to_string()]);

        assert_eq!(violations.len(), 4);
        for v in &violations {
            let expected = if v.rule_id.as_str() == "R200" { Severity::Warning } else { Severity::Error };
            assert_eq!(v.severity, expected);
        }
        // Sorted by path first.
        assert_eq!(violations[0].path, PathBuf::from("/skill/SKILL.md"));
        assert_eq!(violations[3].path, PathBuf::from("/skill/references/b.yaml"));
    }

    #[test]
    fn test_scope_filters_by_reported_rule() {
        let engine = RuleEngine::new(registry(&["references/*"]), rule_set(), "/skill").unwrap();
        let build = context();
        let violations = engine.run(&build.context, Vec::new(), &["R100".to_string()]);

        let r200: Vec<_> = violations.iter().filter(|v| v.rule_id.as_str() == "R200").collect();
        assert_eq!(r200.len(), 1);
        assert_eq!(r200[0].path, PathBuf::from("/skill/references/b.yaml"));
        assert_eq!(violations.iter().filter(|v| v.rule_id.as_str() == "R100").count(), 2);
    }

    #[test]
    fn test_parse_violations_kept_as_is() {
        let engine = RuleEngine::new(registry(&["nowhere/*"]), rule_set(), "/skill").unwrap();
        let build = ContextBuild::from_texts([("/skill/bad.yaml", "a: [1\n")]);
        assert_eq!(build.parse_violations.len(), 1);

        let violations = engine.run(&build.context, build.parse_violations, &["R200".to_string()]);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].rule_id.is_parse_failure());
        assert_eq!(violations[0].severity, Severity::Error);
    }

    #[test]
    fn test_outside_root_matches_absolute_path() {
        let engine = RuleEngine::new(registry(&["/elsewhere/*"]), rule_set(), "/skill").unwrap();
        let build = ContextBuild::from_texts([("/elsewhere/x.yaml", "kind: Secret\n")]);
        let violations = engine.run(&build.context, Vec::new(), &["R100".to_string()]);
        assert_eq!(violations.len(), 2);
    }
}
