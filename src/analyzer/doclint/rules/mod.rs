//! Rule system framework for doclint.
//!
//! Provides the infrastructure for defining and running manifest rules:
//! - `Rule` trait for all rules
//! - `SimpleRule` for stateless checks written as plain functions
//! - `RuleSet` for the registered, ID-indexed rule catalog

use std::collections::HashMap;

use serde_yaml::Value;

use crate::analyzer::doclint::context::{ParsedDocument, ScanContext};
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::types::{RuleCode, Violation};
use crate::error::{ConfigError, Result};

// Rule modules
pub mod r001;
pub mod r005;
pub mod r006;
pub mod r008;
pub mod r009;
pub mod r010;
pub mod r011;
pub mod r015;
pub mod r016;
pub mod r018;
pub mod r020;
pub mod r027;
pub mod r028;
pub mod r029;
pub mod r030;
pub mod r031;
pub mod r032;

/// A rule that checks the scan context.
///
/// Rules never fail: a document whose shape does not match what the rule
/// expects is simply not flagged.
pub trait Rule: Send + Sync {
    /// Get the rule code (e.g., "R001").
    fn code(&self) -> &RuleCode;

    /// Get the human-readable rule name (e.g., "no-latest-tag").
    fn name(&self) -> &str;

    /// Short description of what the rule enforces.
    fn description(&self) -> &str;

    /// Check the context and return any violations.
    fn check(&self, context: &ScanContext) -> Vec<Violation>;
}

/// A rule backed by a plain check function.
pub struct SimpleRule<F>
where
    F: Fn(&ScanContext) -> Vec<Violation> + Send + Sync,
{
    code: RuleCode,
    name: String,
    description: String,
    check_fn: F,
}

impl<F> SimpleRule<F>
where
    F: Fn(&ScanContext) -> Vec<Violation> + Send + Sync,
{
    pub fn new(
        code: impl Into<RuleCode>,
        name: impl Into<String>,
        description: impl Into<String>,
        check_fn: F,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: description.into(),
            check_fn,
        }
    }
}

impl<F> Rule for SimpleRule<F>
where
    F: Fn(&ScanContext) -> Vec<Violation> + Send + Sync,
{
    fn code(&self) -> &RuleCode {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn check(&self, context: &ScanContext) -> Vec<Violation> {
        (self.check_fn)(context)
    }
}

/// Implemented rules indexed by code, in registration order.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. A second rule with the same code is rejected.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<()> {
        let code = rule.code().to_string();
        if self.index.contains_key(&code) {
            return Err(ConfigError::DuplicateRule(code));
        }
        self.index.insert(code, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    /// Merge rule groups into one set, rejecting duplicate codes.
    pub fn compose(groups: impl IntoIterator<Item = Vec<Box<dyn Rule>>>) -> Result<Self> {
        let mut set = Self::new();
        for rule in groups.into_iter().flatten() {
            set.register(rule)?;
        }
        Ok(set)
    }

    /// Look up a rule by code.
    pub fn get(&self, code: &str) -> Option<&dyn Rule> {
        self.index.get(code).map(|&i| self.rules[i].as_ref())
    }

    /// Rule codes in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.code().as_str())
    }

    /// Rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Image reference rules.
pub fn image_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(r001::rule()),
        Box::new(r015::rule()),
        Box::new(r016::rule()),
        Box::new(r018::rule()),
    ]
}

/// Storage and runtime rules.
pub fn storage_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(r005::rule()),
        Box::new(r006::rule()),
        Box::new(r011::rule()),
    ]
}

/// Managed workload identity and hardening rules.
pub fn workload_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(r008::rule()),
        Box::new(r009::rule()),
        Box::new(r010::rule()),
        Box::new(r027::rule()),
        Box::new(r028::rule()),
    ]
}

/// Rules for rendered template artifacts (`index.yaml`).
pub fn template_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(r020::rule()),
        Box::new(r029::rule()),
        Box::new(r030::rule()),
        Box::new(r031::rule()),
    ]
}

/// Rules correlating several documents.
pub fn cross_document_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(r032::rule())]
}

/// The built-in rule library.
pub fn builtin_rules() -> Result<RuleSet> {
    RuleSet::compose([
        image_rules(),
        storage_rules(),
        workload_rules(),
        template_rules(),
        cross_document_rules(),
    ])
}

/// Build a violation for `doc`, positioned at `pattern`, else at
/// `fallback`, else at the document start.
pub fn doc_violation(
    code: &str,
    doc: &ParsedDocument,
    pattern: &str,
    fallback: Option<&str>,
    message: impl Into<String>,
) -> Violation {
    let default = fallback.map(|p| doc.find_line(p, None));
    let line = doc.find_line(pattern, default);
    Violation::new(code, doc.path.clone(), line, message)
}

/// A required value on a managed workload.
pub struct ManagedSetting<'a> {
    pub code: &'a str,
    /// Pulls the value out of the document tree.
    pub extract: fn(&Value) -> Option<&Value>,
    /// Whether the value is the one required.
    pub expected: fn(&Value) -> bool,
    pub value_pattern: &'a str,
    pub fallback_pattern: &'a str,
    pub missing_message: &'a str,
    pub mismatch_message: &'a str,
}

/// Flag every managed app workload whose setting is absent or wrong.
pub fn check_managed_setting(ctx: &ScanContext, setting: &ManagedSetting<'_>) -> Vec<Violation> {
    ctx.checked_documents()
        .filter(|doc| extract::is_managed_app_workload(&doc.value))
        .filter_map(|doc| {
            let value = (setting.extract)(&doc.value);
            if value.map(setting.expected).unwrap_or(false) {
                return None;
            }
            let message = if extract::is_missing(value) {
                setting.missing_message
            } else {
                setting.mismatch_message
            };
            Some(doc_violation(
                setting.code,
                doc,
                setting.value_pattern,
                Some(setting.fallback_pattern),
                message,
            ))
        })
        .collect()
}

/// Line of an image reference: the exact `key: image` line when present,
/// else the first line declaring that key, else the enclosing section.
pub fn image_line(doc: &ParsedDocument, field: extract::ImageField, image: &str) -> u32 {
    let (key, generic, section) = match field {
        extract::ImageField::Origin => (
            extract::ORIGIN_IMAGE_ANNOTATION,
            r"originImageName",
            r"^\s*metadata\s*:",
        ),
        extract::ImageField::Container => ("image", r"^\s*image\s*:", r"^\s*containers\s*:"),
    };
    let section_line = doc.find_line(section, None);
    let generic_line = doc.find_line(generic, Some(section_line));
    doc.find_line(&key_value_pattern(key, image), Some(generic_line))
}

/// Pattern matching a line `key: value`, optionally quoted.
pub fn key_value_pattern(key: &str, value: &str) -> String {
    format!(
        r#"^\s*(?:-\s*)?{}\s*:\s*['"]?{}['"]?\s*$"#,
        regex::escape(key),
        regex::escape(value)
    )
}
