//! A parsed YAML document and its position in the source file.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::locator::LineLocator;
use crate::analyzer::doclint::parser::yaml::DocumentText;

/// File name of rendered template artifacts.
pub const TEMPLATE_ARTIFACT_FILE: &str = "index.yaml";

/// One YAML document after `---` splitting.
#[derive(Debug)]
pub struct ParsedDocument {
    /// File the document was read from.
    pub path: PathBuf,
    /// Absolute line of the document's first line.
    pub start_line: u32,
    /// Document text as it appears in the file.
    pub raw_text: String,
    /// Parsed tree.
    pub value: Value,
    /// Inherited from the enclosing block.
    pub skip_checks: bool,
    locator: LineLocator,
}

impl ParsedDocument {
    /// Build a document and its locator.
    pub fn new(path: impl Into<PathBuf>, doc: DocumentText, value: Value, skip_checks: bool) -> Self {
        let locator = LineLocator::new(doc.start_line, &doc.text);
        Self {
            path: path.into(),
            start_line: doc.start_line,
            raw_text: doc.text,
            value,
            skip_checks,
            locator,
        }
    }

    /// Locate `pattern`, falling back to `default` then the document start.
    pub fn find_line(&self, pattern: &str, default: Option<u32>) -> u32 {
        self.locator.find(pattern, default)
    }

    /// The document's line locator.
    pub fn locator(&self) -> &LineLocator {
        &self.locator
    }

    /// Raw lines paired with their absolute line numbers.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (u32, &str)> {
        self.locator
            .lines()
            .iter()
            .enumerate()
            .map(|(offset, line)| (self.start_line + offset as u32, line.as_str()))
    }

    /// `kind` of the manifest, if any.
    pub fn kind(&self) -> Option<&str> {
        extract::get_str(&self.value, "kind")
    }

    /// `metadata.name` of the manifest, if any.
    pub fn name(&self) -> Option<&str> {
        extract::metadata_name(&self.value)
    }

    /// Whether structural rules may inspect this document.
    pub fn is_checked(&self) -> bool {
        !self.skip_checks
    }

    /// File name of the source, e.g. `index.yaml`.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Whether the document belongs to a rendered template artifact
    /// (`index.yaml`).
    pub fn is_template_artifact(&self) -> bool {
        self.file_name() == Some(TEMPLATE_ARTIFACT_FILE)
    }

    /// Whether the document comes from a standalone YAML file.
    pub fn is_yaml_file(&self) -> bool {
        has_yaml_extension(&self.path)
    }
}

fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "yaml" | "yml"))
        .unwrap_or(false)
}
