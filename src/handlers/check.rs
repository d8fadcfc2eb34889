use std::io::IsTerminal;
use std::path::PathBuf;

use log::info;

use crate::analyzer::doclint::context::builder::scan_root_of;
use crate::analyzer::doclint::{CheckRequest, OutputFormat, format_result, lint};
use crate::cli;
use crate::config::Settings;
use crate::handlers::utils::{DEFAULT_REFERENCES, DEFAULT_RULES_FILE, DEFAULT_SKILL, pick, under_root};

/// Arguments of the `check` command.
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    pub skill: Option<PathBuf>,
    pub references: Option<PathBuf>,
    pub rules_file: Option<PathBuf>,
    pub only: Vec<String>,
    pub artifacts: Vec<String>,
    pub format: Option<cli::OutputFormat>,
}

impl CheckArgs {
    /// Merge flags with settings into a check request and output format.
    pub fn into_request(self, settings: &Settings) -> (CheckRequest, OutputFormat) {
        let skill = pick(self.skill, settings.skill.as_ref(), DEFAULT_SKILL);
        let root = scan_root_of(&skill);
        let references = under_root(
            &pick(self.references, settings.references.as_ref(), DEFAULT_REFERENCES),
            &root,
        );
        let registry = under_root(
            &pick(self.rules_file, settings.rules_file.as_ref(), DEFAULT_RULES_FILE),
            &root,
        );
        let artifacts = clean_list(self.artifacts);
        let artifacts = if artifacts.is_empty() {
            settings.artifacts.clone()
        } else {
            artifacts
        };
        let format = self
            .format
            .map(OutputFormat::from)
            .or_else(|| settings.output_format())
            .unwrap_or_default();

        let request = CheckRequest::new(skill)
            .with_references(references)
            .with_registry(registry)
            .with_only(clean_list(self.only))
            .with_include_paths(artifacts);
        (request, format)
    }
}

/// Trim comma-separated flag entries and drop the empty ones.
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Run the rule set and print the report. Returns whether the check passed.
pub fn handle_check(args: CheckArgs, settings: &Settings) -> crate::Result<bool> {
    let (request, format) = args.into_request(settings);
    info!("checking {}", request.primary.display());

    let result = lint(&request)?;
    let color = format == OutputFormat::Plain && std::io::stdout().is_terminal();
    print!("{}", format_result(&result, format, color));

    Ok(!result.has_failures())
}
