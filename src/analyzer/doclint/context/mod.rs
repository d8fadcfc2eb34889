//! Scan context for doclint rules.
//!
//! The context is an immutable snapshot of every scanned file and every
//! parsed document. Rules only ever read it.

pub mod builder;
pub mod document;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use builder::{ContextBuilder, ContextBuild};
pub use document::ParsedDocument;

/// Everything a rule may inspect during one run.
#[derive(Debug, Default)]
pub struct ScanContext {
    root_paths: Vec<PathBuf>,
    scanned_files: Vec<PathBuf>,
    file_texts: BTreeMap<PathBuf, String>,
    documents: Vec<ParsedDocument>,
}

impl ScanContext {
    /// Create a context from its parts.
    pub fn new(
        root_paths: Vec<PathBuf>,
        scanned_files: Vec<PathBuf>,
        file_texts: BTreeMap<PathBuf, String>,
        documents: Vec<ParsedDocument>,
    ) -> Self {
        Self {
            root_paths,
            scanned_files,
            file_texts,
            documents,
        }
    }

    /// The primary document and the references root.
    pub fn root_paths(&self) -> &[PathBuf] {
        &self.root_paths
    }

    /// Files read for this run, in scan order.
    pub fn scanned_files(&self) -> &[PathBuf] {
        &self.scanned_files
    }

    /// Full text of a scanned file.
    pub fn file_text(&self, path: &Path) -> Option<&str> {
        self.file_texts.get(path).map(String::as_str)
    }

    /// All parsed documents, in scan order.
    pub fn documents(&self) -> &[ParsedDocument] {
        &self.documents
    }

    /// Documents that structural rules may inspect.
    pub fn checked_documents(&self) -> impl Iterator<Item = &ParsedDocument> {
        self.documents.iter().filter(|d| d.is_checked())
    }

    /// Checked documents of the given kind.
    pub fn documents_of_kind<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a ParsedDocument> + 'a {
        self.checked_documents().filter(move |d| d.kind() == Some(kind))
    }

    /// Checked documents of the given kind inside template artifacts.
    pub fn template_artifacts<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a ParsedDocument> + 'a {
        self.documents_of_kind(kind).filter(|d| d.is_template_artifact())
    }
}
