//! Source parsing: fenced-block extraction and YAML document splitting.

pub mod markdown;
pub mod yaml;

use std::path::{Path, PathBuf};

pub use markdown::{extract_blocks, has_negative_marker};
pub use yaml::{ParseOutcome, parse_block, split_documents};

/// One fenced or whole-file region of YAML text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlock {
    /// File the block was read from.
    pub path: PathBuf,
    /// Absolute 1-indexed line of the first line of `raw_text`.
    pub start_line: u32,
    /// Block body without the fences.
    pub raw_text: String,
    /// Findings inside this block are suppressed.
    pub skip_checks: bool,
}

/// How a scanned file is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Scanned for ```yaml / ```yml fences.
    Markdown,
    /// The whole file is one block.
    Yaml,
}

impl SourceKind {
    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" => Some(Self::Markdown),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Split a file into the YAML blocks to check.
pub fn blocks_for_file(path: &Path, text: &str, kind: SourceKind) -> Vec<SourceBlock> {
    match kind {
        SourceKind::Markdown => extract_blocks(path, text),
        SourceKind::Yaml => vec![SourceBlock {
            path: path.to_path_buf(),
            start_line: 1,
            raw_text: text.to_string(),
            skip_checks: false,
        }],
    }
}
