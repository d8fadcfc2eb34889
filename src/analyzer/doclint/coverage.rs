//! MUST-rule coverage validation.
//!
//! Every bullet of the primary document's condensed MUST section must be
//! mapped to either an enforcing rule or a manual-review note:
//!
//! ```yaml
//! must_rules:
//!   - must: "Do not use `:latest`."
//!     enforcement:
//!       type: rule
//!       target: R001
//!   - must: "Keep secrets out of the repository."
//!     enforcement:
//!       type: manual
//!       note: reviewed during release
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde_yaml::Value;

use crate::analyzer::doclint::registry::RegistryConfig;
use crate::error::{ConfigError, Result};

/// Heading that opens the MUST section.
pub const MUST_SECTION_START: &str = "## MUST Rules (Condensed)";
/// Heading that closes the MUST section.
pub const MUST_SECTION_END: &str = "## Validation Commands";

static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*-\s+(.+?)\s*$").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// How a MUST bullet is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enforcement {
    /// Enforced by the rule with this ID.
    Rule { target: String },
    /// Checked by hand.
    Manual { note: String },
}

/// One mapping entry, keyed by its normalised MUST text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MustMapping {
    pub must: String,
    pub enforcement: Enforcement,
}

/// Inputs of a coverage check.
#[derive(Debug, Clone)]
pub struct CoverageRequest {
    pub primary: PathBuf,
    pub mapping: PathBuf,
    pub registry: PathBuf,
}

/// Findings of a coverage check. Empty means covered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    /// Bullets with no mapping entry.
    pub missing: Vec<String>,
    /// Mapping entries whose bullet no longer exists.
    pub stale: Vec<String>,
    /// `(target, must)` for rule mappings naming an undeclared rule.
    pub undefined_targets: Vec<(String, String)>,
}

impl CoverageReport {
    /// Whether every bullet is mapped and every mapping is valid.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.stale.is_empty() && self.undefined_targets.is_empty()
    }

    /// Report lines, in reporting order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.missing.is_empty() {
            lines.push("missing MUST mappings:".to_string());
            lines.extend(self.missing.iter().map(|m| format!("  - {}", m)));
        }
        if !self.stale.is_empty() {
            lines.push("stale MUST mappings (not found in SKILL.md MUST section):".to_string());
            lines.extend(self.stale.iter().map(|m| format!("  - {}", m)));
        }
        lines.extend(self.undefined_targets.iter().map(|(target, must)| {
            format!("rule mapping points to undefined rule id: {} (must: {})", target, must)
        }));
        lines
    }
}

/// Collapse whitespace runs and trim.
pub fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Bullets of the MUST section, normalised. Bullets ending in `:` introduce
/// sub-lists and are skipped.
pub fn extract_must_bullets(text: &str) -> Result<Vec<String>> {
    let boundaries = text
        .find(MUST_SECTION_START)
        .and_then(|start| text[start..].find(MUST_SECTION_END).map(|len| (start, start + len)));
    let Some((start, end)) = boundaries else {
        return Err(ConfigError::Coverage(
            "unable to locate MUST section boundaries in SKILL.md".to_string(),
        ));
    };

    Ok(text[start..end]
        .lines()
        .filter_map(|line| BULLET.captures(line))
        .map(|caps| normalize(&caps[1]))
        .filter(|bullet| !bullet.is_empty() && !bullet.ends_with(':'))
        .collect())
}

/// Parse mapping file text.
pub fn parse_mapping(text: &str, origin: &Path) -> Result<Vec<MustMapping>> {
    let invalid = |message: String| ConfigError::Coverage(message);

    let data: Value = serde_yaml::from_str(text)
        .map_err(|e| invalid(format!("invalid must-rules mapping {}: {}", origin.display(), e)))?;
    let Some(entries) = data.get("must_rules").and_then(Value::as_sequence) else {
        return Err(invalid(format!(
            "invalid must-rules mapping format: {}",
            origin.display()
        )));
    };

    let mut seen = HashSet::new();
    let mut mappings = Vec::with_capacity(entries.len());
    for entry in entries {
        let (Some(must), Some(enforcement)) = (
            entry.get("must").and_then(Value::as_str),
            entry.get("enforcement").filter(|e| e.is_mapping()),
        ) else {
            return Err(invalid(format!("invalid must-rules entry: {}", describe(entry))));
        };

        let key = normalize(must);
        if !seen.insert(key.clone()) {
            return Err(invalid(format!("duplicate must mapping entry: {}", must)));
        }

        let text_field = |name: &str| enforcement.get(name).and_then(Value::as_str).map(str::to_string);
        let enforcement = match enforcement.get("type").and_then(Value::as_str) {
            Some("rule") => Enforcement::Rule {
                target: text_field("target").ok_or_else(|| {
                    invalid(format!(
                        "rule enforcement must define string target for must entry: {:?}",
                        must
                    ))
                })?,
            },
            Some("manual") => Enforcement::Manual {
                note: text_field("note").ok_or_else(|| {
                    invalid(format!("manual enforcement must define note for must entry: {:?}", must))
                })?,
            },
            _ => {
                return Err(invalid(format!(
                    "invalid enforcement type for must entry {:?}: {} (allowed: manual, rule)",
                    must,
                    describe(enforcement.get("type").unwrap_or(&Value::Null))
                )));
            }
        };
        mappings.push(MustMapping {
            must: key,
            enforcement,
        });
    }
    Ok(mappings)
}

/// Compare bullets and mappings against the declared rule IDs.
pub fn compare(bullets: &[String], mappings: &[MustMapping], rule_ids: &BTreeSet<String>) -> CoverageReport {
    let bullet_set: HashSet<&str> = bullets.iter().map(String::as_str).collect();
    let mapped: HashSet<&str> = mappings.iter().map(|m| m.must.as_str()).collect();

    CoverageReport {
        missing: bullets
            .iter()
            .filter(|b| !mapped.contains(b.as_str()))
            .cloned()
            .collect(),
        stale: mappings
            .iter()
            .filter(|m| !bullet_set.contains(m.must.as_str()))
            .map(|m| m.must.clone())
            .collect(),
        undefined_targets: mappings
            .iter()
            .filter_map(|m| match &m.enforcement {
                Enforcement::Rule { target } if !rule_ids.contains(target) => {
                    Some((target.clone(), m.must.clone()))
                }
                _ => None,
            })
            .collect(),
    }
}

/// Run a coverage check over files on disk.
pub fn check_coverage(request: &CoverageRequest) -> Result<CoverageReport> {
    let required: [(&'static str, &Path); 3] = [
        ("primary document", &request.primary),
        ("must-rules mapping", &request.mapping),
        ("rules registry", &request.registry),
    ];
    for (what, path) in required {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                what,
                path: path.to_path_buf(),
            });
        }
    }

    let primary = fs::read_to_string(&request.primary).map_err(|e| ConfigError::io(&request.primary, e))?;
    let mapping_text = fs::read_to_string(&request.mapping).map_err(|e| ConfigError::io(&request.mapping, e))?;

    let bullets = extract_must_bullets(&primary)?;
    let mappings = parse_mapping(&mapping_text, &request.mapping)?;
    let registry = RegistryConfig::load(&request.registry)?;
    let rule_ids: BTreeSet<String> = registry.ordered_ids().iter().cloned().collect();

    debug!(
        "coverage: {} bullet(s), {} mapping(s), {} rule(s)",
        bullets.len(),
        mappings.len(),
        rule_ids.len()
    );
    Ok(compare(&bullets, &mappings, &rule_ids))
}

fn describe(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKILL: &str = r#"# Skill

## MUST Rules (Condensed)

- Do not use `:latest`.
- Persist data:
  - Never   use emptyDir.
- Review secrets by hand.

## Validation Commands

- not a must bullet
"#;

    const MAPPING: &str = r#"must_rules:
  - must: "Do not use `:latest`."
    enforcement:
      type: rule
      target: R001
  - must: "Never use emptyDir."
    enforcement:
      type: rule
      target: R404
  - must: "Removed bullet"
    enforcement:
      type: manual
      note: obsolete
"#;

    fn mapping(text: &str) -> Result<Vec<MustMapping>> {
        parse_mapping(text, Path::new("must-rules-map.yaml"))
    }

    #[test]
    fn test_extract_bullets() {
        let bullets = extract_must_bullets(SKILL).unwrap();
        assert_eq!(
            bullets,
            vec!["Do not use `:latest`.", "Never use emptyDir.", "Review secrets by hand."]
        );
    }

    #[test]
    fn test_missing_boundaries() {
        let err = extract_must_bullets("# Skill\n\n## MUST Rules (Condensed)\n- a\n").unwrap_err();
        assert!(err.to_string().contains("MUST section boundaries"));
    }

    #[test]
    fn test_report() {
        let bullets = extract_must_bullets(SKILL).unwrap();
        let mappings = mapping(MAPPING).unwrap();
        let ids: BTreeSet<String> = ["R001".to_string()].into_iter().collect();
        let report = compare(&bullets, &mappings, &ids);

        assert!(!report.is_clean());
        assert_eq!(
            report.lines(),
            vec![
                "missing MUST mappings:",
                "  - Review secrets by hand.",
                "stale MUST mappings (not found in SKILL.md MUST section):",
                "  - Removed bullet",
                "rule mapping points to undefined rule id: R404 (must: Never use emptyDir.)",
            ]
        );
    }

    #[test]
    fn test_mapping_validation() {
        assert!(mapping("must_rules: {}").is_err());
        assert!(mapping("must_rules:\n  - must: a\n").is_err());
        assert!(mapping("must_rules:\n  - {must: a, enforcement: {type: rule}}\n").is_err());
        assert!(mapping("must_rules:\n  - {must: a, enforcement: {type: manual}}\n").is_err());
        assert!(mapping("must_rules:\n  - {must: a, enforcement: {type: auto, target: R1}}\n").is_err());

        let err = mapping(
            "must_rules:\n  - {must: a  b, enforcement: {type: manual, note: x}}\n  - {must: a b, enforcement: {type: manual, note: y}}\n",
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("duplicate must mapping entry"));
    }
}
