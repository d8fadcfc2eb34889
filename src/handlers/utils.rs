use std::path::{Path, PathBuf};

use crate::analyzer::doclint::context::builder::resolve_path;

pub const DEFAULT_SKILL: &str = "SKILL.md";
pub const DEFAULT_REFERENCES: &str = "references";
pub const DEFAULT_RULES_FILE: &str = "references/rules-registry.yaml";
pub const DEFAULT_MAPPING: &str = "references/must-rules-map.yaml";

/// Flag value, else settings value, else the default.
pub fn pick(flag: Option<PathBuf>, setting: Option<&PathBuf>, default: &str) -> PathBuf {
    flag.or_else(|| setting.cloned())
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Resolve `path` against the primary document's directory unless absolute.
pub fn under_root(path: &Path, root: &Path) -> PathBuf {
    resolve_path(&path.to_string_lossy(), root)
}
