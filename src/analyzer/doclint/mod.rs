//! Doclint: manifest linter for YAML embedded in Markdown.
//!
//! Recovers Kubernetes-style YAML documents from fenced code blocks in
//! Markdown and from standalone YAML files, runs a registry-declared set of
//! rules over them and reports every finding at its exact source line.
//!
//! # Features
//!
//! - Fenced block extraction with negative-example suppression
//! - Multi-document splitting with absolute line tracking
//! - Cached key/regex line lookup per document
//! - Registry-driven rule selection, severity and path scoping
//! - Plain, JSON and GitHub Actions output
//! - MUST-rule coverage validation against a mapping file
//!
//! # Example
//!
//! ```rust,ignore
//! use manifest_lint::analyzer::doclint::{CheckRequest, lint};
//!
//! let request = CheckRequest::new("skill/SKILL.md").with_only(["R001", "R005"]);
//! let result = lint(&request)?;
//!
//! for v in &result.violations {
//!     println!("[{}/{}] {}:{}: {}", v.rule_id, v.severity, v.path.display(), v.line, v.message);
//! }
//! ```
//!
//! # Rules
//!
//! | Code | Name                    | Description                                                |
//! |------|-------------------------|------------------------------------------------------------|
//! | R000 | (parser)                | YAML that failed to parse                                  |
//! | R001 | no-latest-tag           | No `:latest` image tags                                    |
//! | R005 | no-empty-dir            | No `emptyDir` volumes                                      |
//! | R006 | image-pull-policy       | `imagePullPolicy: IfNotPresent` on every container         |
//! | R008 | deploy-manager-label    | Deploy-manager label equals `metadata.name`                |
//! | R009 | revision-history-limit  | `revisionHistoryLimit: 1` on managed workloads             |
//! | R010 | no-service-account-token| `automountServiceAccountToken: false` on managed workloads |
//! | R011 | pvc-storage-limit       | Concrete PVC storage of at most 1Gi                        |
//! | R015 | origin-image-match      | `originImageName` matches a container image                |
//! | R016 | no-floating-tag         | No floating image tags on managed workloads                |
//! | R018 | no-compose-variables    | No `$VAR` / `${VAR}` in managed workload images            |
//! | R020 | named-service-ports     | Named ports on template artifact Services                  |
//! | R027 | app-label               | `labels.app` equals `metadata.name`                        |
//! | R028 | container-name          | Container names equal `metadata.name`                      |
//! | R029 | service-identity        | Service name and labels equal `spec.selector.app`          |
//! | R030 | configmap-identity      | ConfigMap labels equal `metadata.name`                     |
//! | R031 | ingress-identity        | Ingress label and backends equal `metadata.name`           |
//! | R032 | service-selector-target | Service selector names a workload in the same file         |

pub mod context;
pub mod coverage;
pub mod engine;
pub mod extract;
pub mod formatter;
pub mod lint;
pub mod locator;
pub mod parser;
pub mod registry;
pub mod rules;
pub mod types;

// Re-export main types and functions
pub use context::{ContextBuild, ContextBuilder, ParsedDocument, ScanContext};
pub use coverage::{CoverageReport, CoverageRequest, check_coverage};
pub use engine::RuleEngine;
pub use formatter::{OutputFormat, format_result};
pub use lint::{CheckRequest, LintResult, LintSummary, lint, lint_with, run_checks, run_checks_with};
pub use locator::LineLocator;
pub use registry::{RegistryConfig, RuleDescriptor};
pub use rules::{Rule, RuleSet, SimpleRule, builtin_rules};
pub use types::{PARSE_RULE_ID, RuleCode, Severity, Violation};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_registry_matches_builtin_rules() {
        let text = include_str!("../../../registry/rules-registry.yaml");
        let registry = RegistryConfig::parse(text, std::path::Path::new("rules-registry.yaml")).unwrap();
        let rules = builtin_rules().unwrap();
        registry.validate_against(rules.ids()).unwrap();

        for rule in rules.iter() {
            assert!(registry.rule(rule.code().as_str()).is_some());
        }
    }
}
