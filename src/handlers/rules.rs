use std::path::PathBuf;

use colored::Colorize;

use crate::analyzer::doclint::context::builder::scan_root_of;
use crate::analyzer::doclint::{RegistryConfig, builtin_rules};
use crate::config::Settings;
use crate::handlers::utils::{DEFAULT_RULES_FILE, DEFAULT_SKILL, pick, under_root};

/// Print the built-in rules.
///
/// Severity and description come from the registry when one is found; an
/// explicitly named registry must exist and match the built-in rules.
pub fn handle_rules(rules_file: Option<PathBuf>, settings: &Settings) -> crate::Result<()> {
    let rules = builtin_rules()?;

    let explicit = rules_file.is_some() || settings.rules_file.is_some();
    let root = scan_root_of(&pick(None, settings.skill.as_ref(), DEFAULT_SKILL));
    let path = under_root(&pick(rules_file, settings.rules_file.as_ref(), DEFAULT_RULES_FILE), &root);

    let registry = if explicit || path.is_file() {
        let registry = RegistryConfig::load(&path)?;
        registry.validate_against(rules.ids())?;
        Some(registry)
    } else {
        None
    };

    for rule in rules.iter() {
        let descriptor = registry.as_ref().and_then(|r| r.rule(rule.code().as_str()));
        let severity = descriptor.map(|d| d.severity.to_string()).unwrap_or_else(|| "-".to_string());
        let description = descriptor.map(|d| d.description.as_str()).unwrap_or(rule.description());
        println!(
            "{}  {:<8} {:<24} {}",
            rule.code().as_str().bold(),
            severity,
            rule.name(),
            description
        );
    }
    Ok(())
}
