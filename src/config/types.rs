use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analyzer::doclint::OutputFormat;

/// Project settings read from `.manifest-lint.toml`.
///
/// Every key is optional. Command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Primary document, relative to the working directory.
    pub skill: Option<PathBuf>,
    /// References directory, relative to the primary document's directory.
    pub references: Option<PathBuf>,
    /// Rules registry, relative to the primary document's directory.
    pub rules_file: Option<PathBuf>,
    /// MUST coverage mapping, relative to the primary document's directory.
    pub mapping: Option<PathBuf>,
    /// Extra artifact files or directories to scan.
    pub artifacts: Vec<String>,
    /// Output format: `plain`, `json` or `github`.
    pub format: Option<String>,
}

impl Settings {
    /// Output format named by the file, if any.
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.format.as_deref().and_then(OutputFormat::parse)
    }
}
