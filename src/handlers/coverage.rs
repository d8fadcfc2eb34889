use std::path::PathBuf;

use crate::analyzer::doclint::context::builder::scan_root_of;
use crate::analyzer::doclint::{CoverageRequest, check_coverage};
use crate::config::Settings;
use crate::handlers::utils::{DEFAULT_MAPPING, DEFAULT_RULES_FILE, DEFAULT_SKILL, pick, under_root};

/// Validate MUST coverage and print the report. Returns whether it passed.
pub fn handle_coverage(
    skill: Option<PathBuf>,
    mapping: Option<PathBuf>,
    rules_file: Option<PathBuf>,
    settings: &Settings,
) -> crate::Result<bool> {
    let primary = pick(skill, settings.skill.as_ref(), DEFAULT_SKILL);
    let root = scan_root_of(&primary);
    let request = CoverageRequest {
        mapping: under_root(&pick(mapping, settings.mapping.as_ref(), DEFAULT_MAPPING), &root),
        registry: under_root(
            &pick(rules_file, settings.rules_file.as_ref(), DEFAULT_RULES_FILE),
            &root,
        ),
        primary,
    };

    let report = check_coverage(&request)?;
    if report.is_clean() {
        println!("MUST coverage check passed.");
        return Ok(true);
    }

    println!("MUST coverage check failed:");
    for line in report.lines() {
        println!("- {}", line);
    }
    Ok(false)
}
