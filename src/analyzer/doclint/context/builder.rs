//! Builds the scan context from the primary document, the references root
//! and the include list.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::{ParsedDocument, ScanContext};
use crate::analyzer::doclint::parser::{ParseOutcome, SourceKind, blocks_for_file, parse_block};
use crate::analyzer::doclint::types::Violation;
use crate::error::{ConfigError, Result};

/// Output of a context build: the context plus the parse-time violations,
/// kept apart until the engine merges them.
#[derive(Debug)]
pub struct ContextBuild {
    pub context: ScanContext,
    pub parse_violations: Vec<Violation>,
}

/// Collects scan inputs and produces a [`ScanContext`].
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    primary: PathBuf,
    references_root: PathBuf,
    include_paths: Vec<String>,
}

impl ContextBuilder {
    /// Start a builder for a primary document and references root.
    pub fn new(primary: impl Into<PathBuf>, references_root: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            references_root: references_root.into(),
            include_paths: Vec::new(),
        }
    }

    /// Add include entries (files or directories, relative to the primary
    /// document's directory unless absolute).
    pub fn with_includes<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_paths.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Directory that relative include entries resolve against.
    pub fn scan_root(&self) -> PathBuf {
        scan_root_of(&self.primary)
    }

    /// Resolve the ordered, de-duplicated list of files to scan.
    pub fn scan_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        if self.include_paths.is_empty() {
            paths.push(self.primary.clone());
            paths.extend(supported_files(&self.references_root));
        } else {
            let root = self.scan_root();
            for entry in &self.include_paths {
                let path = resolve_path(entry, &root);
                if !path.exists() {
                    return Err(ConfigError::IncludeNotFound(path));
                }
                if path.is_dir() {
                    paths.extend(supported_files(&path));
                } else if SourceKind::from_path(&path).is_some() {
                    paths.push(path);
                } else {
                    return Err(ConfigError::UnsupportedInclude(path));
                }
            }
        }

        let mut seen = HashSet::new();
        paths.retain(|p| seen.insert(p.clone()));
        Ok(paths)
    }

    /// Read, extract and parse every scanned file.
    pub fn build(&self) -> Result<ContextBuild> {
        let sources = self
            .scan_paths()?
            .into_iter()
            .map(|path| {
                let text = fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
                Ok((path, text))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ContextBuild::from_sources(
            vec![self.primary.clone(), self.references_root.clone()],
            sources,
        ))
    }
}

impl ContextBuild {
    /// Extract and parse already-loaded sources, in order.
    pub fn from_sources(root_paths: Vec<PathBuf>, sources: Vec<(PathBuf, String)>) -> Self {
        let mut scanned = Vec::with_capacity(sources.len());
        let mut file_texts = BTreeMap::new();
        let mut documents = Vec::new();
        let mut parse_violations = Vec::new();

        for (path, text) in sources {
            let kind = SourceKind::from_path(&path).unwrap_or(SourceKind::Yaml);
            let blocks = blocks_for_file(&path, &text, kind);
            let before = documents.len();

            for block in &blocks {
                for outcome in parse_block(block) {
                    match outcome {
                        ParseOutcome::Parsed(doc, value) => documents.push(ParsedDocument::new(
                            block.path.clone(),
                            doc,
                            value,
                            block.skip_checks,
                        )),
                        ParseOutcome::Invalid(violation) => parse_violations.push(violation),
                        ParseOutcome::Dropped => {}
                    }
                }
            }

            debug!(
                "scanned {}: {} block(s), {} document(s)",
                path.display(),
                blocks.len(),
                documents.len() - before
            );
            scanned.push(path.clone());
            file_texts.insert(path, text);
        }

        Self {
            context: ScanContext::new(root_paths, scanned, file_texts, documents),
            parse_violations,
        }
    }

    /// Build from in-memory `(path, text)` pairs.
    pub fn from_texts<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::from_sources(
            Vec::new(),
            sources
                .into_iter()
                .map(|(path, text)| (PathBuf::from(path), text.to_string()))
                .collect(),
        )
    }
}

/// Directory containing the primary document.
pub fn scan_root_of(primary: &Path) -> PathBuf {
    match primary.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resolve `value` against `base` unless it is absolute.
pub fn resolve_path(value: &str, base: &Path) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let joined = base.join(path);
    fs::canonicalize(&joined).unwrap_or(joined)
}

/// Every Markdown and YAML file below `root`, sorted by path.
pub fn supported_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| SourceKind::from_path(p).is_some())
        .collect();
    files.sort();
    files
}
