//! Main linting orchestration for doclint.
//!
//! This module ties together the registry, the scan context and the rule
//! engine to provide the main check API.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::analyzer::doclint::context::ContextBuilder;
use crate::analyzer::doclint::context::builder::scan_root_of;
use crate::analyzer::doclint::engine::RuleEngine;
use crate::analyzer::doclint::registry::{RegistryConfig, default_registry_path};
use crate::analyzer::doclint::rules::{RuleSet, builtin_rules};
use crate::analyzer::doclint::types::{Severity, Violation};
use crate::error::{ConfigError, Result};

/// Inputs of one check run.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    /// Primary Markdown document. Its directory is the scan root.
    pub primary: PathBuf,
    /// Directory of supplementary files scanned by default.
    pub references: PathBuf,
    /// Rules registry file.
    pub registry: PathBuf,
    /// Restrict the run to these rule IDs. Empty runs every declared rule.
    pub only: Vec<String>,
    /// Extra include entries, appended after the registry's own.
    pub include_paths: Vec<String>,
}

impl CheckRequest {
    /// Request with the conventional layout around `primary`:
    /// `references/` and `references/rules-registry.yaml` next to it.
    pub fn new(primary: impl Into<PathBuf>) -> Self {
        let primary = primary.into();
        let root = scan_root_of(&primary);
        Self {
            references: root.join("references"),
            registry: default_registry_path(&root),
            primary,
            only: Vec::new(),
            include_paths: Vec::new(),
        }
    }

    /// Set the references directory.
    pub fn with_references(mut self, references: impl Into<PathBuf>) -> Self {
        self.references = references.into();
        self
    }

    /// Set the registry file.
    pub fn with_registry(mut self, registry: impl Into<PathBuf>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Restrict the run to the given rule IDs.
    pub fn with_only<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Add include entries (artifact files or directories).
    pub fn with_include_paths<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_paths.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Directory containing the primary document.
    pub fn scan_root(&self) -> PathBuf {
        scan_root_of(&self.primary)
    }

    fn ensure_inputs(&self) -> Result<()> {
        let required: [(&'static str, &Path, bool); 3] = [
            ("primary document", &self.primary, self.primary.is_file()),
            ("references directory", &self.references, self.references.is_dir()),
            ("rules registry", &self.registry, self.registry.is_file()),
        ];
        for (what, path, present) in required {
            if !present {
                return Err(ConfigError::NotFound {
                    what,
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}

/// Counts describing a finished run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintSummary {
    /// Number of violations.
    pub total: usize,
    /// Number of violations with error severity.
    pub errors: usize,
    /// Number of violations with warning severity.
    pub warnings: usize,
    /// Whether the run produced no violations.
    pub passed: bool,
    /// Number of rules selected for the run.
    pub rules_run: usize,
    /// Number of files read.
    pub files_scanned: usize,
    /// Number of YAML documents parsed.
    pub documents: usize,
}

/// Result of a check run.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    /// Sorted violations.
    pub violations: Vec<Violation>,
    /// Run summary.
    pub summary: LintSummary,
    /// Directory violation paths are shown relative to.
    #[serde(skip)]
    pub scan_root: PathBuf,
}

impl LintResult {
    /// Build a result and its counts.
    pub fn new(violations: Vec<Violation>, rules_run: usize, scan_root: impl Into<PathBuf>) -> Self {
        let errors = violations.iter().filter(|v| v.severity == Severity::Error).count();
        let warnings = violations.iter().filter(|v| v.severity == Severity::Warning).count();
        Self {
            summary: LintSummary {
                total: violations.len(),
                errors,
                warnings,
                passed: violations.is_empty(),
                rules_run,
                ..LintSummary::default()
            },
            violations,
            scan_root: scan_root.into(),
        }
    }

    /// Any violation fails a run, whatever its severity.
    pub fn has_failures(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Get the maximum severity in the results.
    pub fn max_severity(&self) -> Option<Severity> {
        self.violations.iter().map(|v| v.severity).max()
    }
}

/// Run a check with the built-in rule library.
pub fn lint(request: &CheckRequest) -> Result<LintResult> {
    lint_with(request, builtin_rules()?)
}

/// Run a check with a custom rule set.
pub fn lint_with(request: &CheckRequest, rules: RuleSet) -> Result<LintResult> {
    request.ensure_inputs()?;

    let registry = RegistryConfig::load(&request.registry)?;
    let scan_root = request.scan_root();
    let include_paths: Vec<String> = registry
        .include_paths
        .iter()
        .chain(&request.include_paths)
        .cloned()
        .collect();

    let engine = RuleEngine::new(registry, rules, &scan_root)?;
    let selected = engine.resolve_rules(&request.only)?;
    debug!("selected rules: {}", selected.join(", "));

    let build = ContextBuilder::new(&request.primary, &request.references)
        .with_includes(include_paths)
        .build()?;
    let files_scanned = build.context.scanned_files().len();
    let documents = build.context.documents().len();

    let violations = engine.run(&build.context, build.parse_violations, &selected);

    let mut result = LintResult::new(violations, selected.len(), scan_root);
    result.summary.files_scanned = files_scanned;
    result.summary.documents = documents;
    Ok(result)
}

/// Run a check with the built-in rules and return only the violations.
pub fn run_checks(request: &CheckRequest) -> Result<Vec<Violation>> {
    lint(request).map(|result| result.violations)
}

/// Run a check with a custom rule set and return only the violations.
pub fn run_checks_with(request: &CheckRequest, rules: RuleSet) -> Result<Vec<Violation>> {
    lint_with(request, rules).map(|result| result.violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::doclint::rules::{Rule, r005};
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn only_r005_registry() -> &'static str {
        "version: 1\nrules:\n  - id: R005\n    description: no emptyDir\n    severity: warning\n"
    }

    fn r005_only() -> RuleSet {
        RuleSet::compose([vec![Box::new(r005::rule()) as Box<dyn Rule>]]).unwrap()
    }

    #[test]
    fn test_missing_inputs_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let request = CheckRequest::new(dir.path().join("SKILL.md"));
        let err = lint(&request).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { what: "primary document", .. }));

        write(dir.path(), "SKILL.md", "# Skill\n");
        let err = lint(&request).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { what: "references directory", .. }));

        fs::create_dir(dir.path().join("references")).unwrap();
        let err = lint(&request).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { what: "rules registry", .. }));
    }

    #[test]
    fn test_custom_rule_set_run() {
        let dir = TempDir::new().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        write(&root, "SKILL.md", "# Skill\n\n```yaml\ncache:\n  emptyDir: {}\n```\n");
        write(&root, "references/rules-registry.yaml", only_r005_registry());

        let request = CheckRequest::new(root.join("SKILL.md"));
        let result = lint_with(&request, r005_only()).unwrap();

        assert!(result.has_failures());
        assert_eq!(result.summary.rules_run, 1);
        assert_eq!(result.summary.warnings, 1);
        assert_eq!(result.summary.files_scanned, 2);
        assert_eq!(result.violations[0].line, 5);
        assert_eq!(result.violations[0].path, root.join("SKILL.md"));
        assert_eq!(result.max_severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_builtin_rules_against_partial_registry() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "SKILL.md", "# Skill\n");
        write(dir.path(), "references/rules-registry.yaml", only_r005_registry());

        let err = run_checks(&CheckRequest::new(dir.path().join("SKILL.md"))).unwrap_err();
        assert!(matches!(err, ConfigError::RuleSetMismatch { .. }));
    }

    #[test]
    fn test_unknown_only_rule() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "SKILL.md", "# Skill\n");
        write(dir.path(), "references/rules-registry.yaml", only_r005_registry());

        let request = CheckRequest::new(dir.path().join("SKILL.md")).with_only(["R404"]);
        let err = run_checks_with(&request, r005_only()).unwrap_err();
        assert_eq!(err.to_string(), "unknown rule id(s): R404");
    }
}
