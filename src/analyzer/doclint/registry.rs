//! Rule registry loading and validation.
//!
//! The registry is a YAML file declaring, in order, every rule that may run:
//!
//! ```yaml
//! version: 1
//! scope:
//!   include: [SKILL.md, references]
//! rules:
//!   - id: R001
//!     description: forbid ':latest' image tags
//!     severity: error
//!     scope:
//!       include_paths: ["references/*.md"]
//! ```
//!
//! The declared ID set must equal the implemented ID set exactly.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde_yaml::{Mapping, Value};

use crate::analyzer::doclint::types::{RuleCode, Severity};
use crate::error::{ConfigError, Result};

/// Declarative description of one rule.
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    pub id: RuleCode,
    pub description: String,
    pub severity: Severity,
    /// Path globs the rule's findings are limited to. Empty means everywhere.
    pub include_paths: Vec<Pattern>,
}

impl RuleDescriptor {
    /// Create a descriptor that applies everywhere.
    pub fn new(id: impl Into<RuleCode>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            severity,
            include_paths: Vec::new(),
        }
    }

    /// Whether a scan-root-relative path is inside this rule's scope.
    pub fn in_scope(&self, relative_path: &str) -> bool {
        self.include_paths.is_empty() || self.include_paths.iter().any(|p| p.matches(relative_path))
    }
}

/// Parsed registry file.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Global include entries fed to the context builder.
    pub include_paths: Vec<String>,
    rules: HashMap<String, RuleDescriptor>,
    ordered_ids: Vec<String>,
}

impl RegistryConfig {
    /// Load and parse a registry file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                what: "rules registry",
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::parse(&text, path)
    }

    /// Parse registry text. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let invalid = |message: String| ConfigError::registry(origin, message);

        let data: Value = serde_yaml::from_str(text).map_err(|e| invalid(e.to_string()))?;
        let Some(root) = data.as_mapping() else {
            return Err(invalid("invalid rules registry format".to_string()));
        };
        let Some(entries) = root.get("rules").and_then(Value::as_sequence) else {
            return Err(invalid("invalid rules list in registry".to_string()));
        };

        let include_paths = match root.get("scope").and_then(Value::as_mapping) {
            Some(scope) => string_list(scope.get("include"))
                .ok_or_else(|| invalid("scope.include must be a list of strings".to_string()))?,
            None => Vec::new(),
        };

        let mut config = Self {
            include_paths,
            ..Self::default()
        };
        for entry in entries {
            let descriptor = parse_rule(entry).map_err(invalid)?;
            let id = descriptor.id.to_string();
            if config.rules.contains_key(&id) {
                return Err(ConfigError::DuplicateRule(id));
            }
            config.ordered_ids.push(id.clone());
            config.rules.insert(id, descriptor);
        }
        Ok(config)
    }

    /// Build a registry from descriptors, in order.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = RuleDescriptor>) -> Result<Self> {
        let mut config = Self::default();
        for descriptor in descriptors {
            let id = descriptor.id.to_string();
            if config.rules.contains_key(&id) {
                return Err(ConfigError::DuplicateRule(id));
            }
            config.ordered_ids.push(id.clone());
            config.rules.insert(id, descriptor);
        }
        Ok(config)
    }

    /// Set the global include entries.
    pub fn with_include_paths(mut self, include_paths: Vec<String>) -> Self {
        self.include_paths = include_paths;
        self
    }

    /// Descriptor for a rule ID.
    pub fn rule(&self, id: &str) -> Option<&RuleDescriptor> {
        self.rules.get(id)
    }

    /// Rule IDs in declaration order.
    pub fn ordered_ids(&self) -> &[String] {
        &self.ordered_ids
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.ordered_ids.iter().filter_map(|id| self.rules.get(id))
    }

    /// Fail unless the declared IDs equal `implemented` exactly.
    pub fn validate_against<'a>(&self, implemented: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let declared: BTreeSet<&str> = self.ordered_ids.iter().map(String::as_str).collect();
        let implemented: BTreeSet<&str> = implemented.into_iter().collect();

        let declared_only: Vec<String> = declared.difference(&implemented).map(|s| s.to_string()).collect();
        let implemented_only: Vec<String> = implemented.difference(&declared).map(|s| s.to_string()).collect();

        if declared_only.is_empty() && implemented_only.is_empty() {
            return Ok(());
        }
        Err(ConfigError::RuleSetMismatch {
            declared_only,
            implemented_only,
        })
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Sequence(items)) => items.iter().map(|v| v.as_str().map(str::to_string)).collect(),
        Some(_) => None,
    }
}

fn describe(entry: &Value) -> String {
    serde_json::to_string(entry).unwrap_or_else(|_| format!("{:?}", entry))
}

fn parse_rule(entry: &Value) -> std::result::Result<RuleDescriptor, String> {
    let map: &Mapping = entry
        .as_mapping()
        .ok_or_else(|| format!("invalid rule entry in registry: {}", describe(entry)))?;

    let (Some(id), Some(description)) = (
        map.get("id").and_then(Value::as_str),
        map.get("description").and_then(Value::as_str),
    ) else {
        return Err(format!("invalid rule entry in registry: {}", describe(entry)));
    };

    let severity = match map.get("severity") {
        None => Severity::default(),
        Some(value) => value.as_str().and_then(Severity::parse).ok_or_else(|| {
            format!(
                "invalid severity for {}: {} (allowed: error, warning)",
                id,
                describe(value)
            )
        })?,
    };

    let include_paths = match map.get("scope") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Mapping(scope)) => string_list(scope.get("include_paths")).ok_or_else(|| {
            format!(
                "rule scope.include_paths must be a list of strings: {}",
                describe(entry)
            )
        })?,
        Some(_) => return Err(format!("rule scope must be an object: {}", describe(entry))),
    };

    let include_paths = include_paths
        .iter()
        .map(|glob| {
            Pattern::new(glob).map_err(|e| format!("invalid scope glob for {}: {:?}: {}", id, glob, e))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(RuleDescriptor {
        id: RuleCode::new(id),
        description: description.to_string(),
        severity,
        include_paths,
    })
}

/// Default registry location relative to the primary document's directory.
pub fn default_registry_path(scan_root: &Path) -> PathBuf {
    scan_root.join("references").join("rules-registry.yaml")
}
