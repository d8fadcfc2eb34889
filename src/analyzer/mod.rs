//! # Analyzer Module
//!
//! Linting of Kubernetes-style manifests embedded in Markdown and YAML files.

pub mod doclint;
