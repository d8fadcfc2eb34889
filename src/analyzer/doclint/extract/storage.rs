//! Storage quantity utilities.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use super::{get_path, scalar_text};

/// Largest PVC request allowed (1Gi).
pub const MAX_PVC_STORAGE_BYTES: u64 = 1024 * 1024 * 1024;

static QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)\s*([A-Za-z]*)$").unwrap());

static SHELL_SUBSTITUTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\([^)]+\)").unwrap());

fn unit_factor(unit: &str) -> Option<u64> {
    let factor = match unit {
        "" => 1,
        "k" => 1000,
        "m" => 1000u64.pow(2),
        "g" => 1000u64.pow(3),
        "t" => 1000u64.pow(4),
        "p" => 1000u64.pow(5),
        "e" => 1000u64.pow(6),
        "ki" => 1024,
        "mi" => 1024u64.pow(2),
        "gi" => 1024u64.pow(3),
        "ti" => 1024u64.pow(4),
        "pi" => 1024u64.pow(5),
        "ei" => 1024u64.pow(6),
        _ => return None,
    };
    Some(factor)
}

/// Parse a storage quantity such as `512Mi` or `1.5G` into bytes.
///
/// Units are case-insensitive, so `1M` and `1m` are both megabytes.
pub fn parse_storage_bytes(raw: &str) -> Option<u64> {
    let caps = QUANTITY.captures(raw.trim())?;
    let number: f64 = caps[1].parse().ok()?;
    let factor = unit_factor(&caps[2].to_ascii_lowercase())?;
    Some((number * factor as f64) as u64)
}

/// Whether the value is a template or shell expression instead of a
/// concrete quantity.
pub fn has_variable_expression(raw: &str) -> bool {
    let text = raw.trim();
    text.contains("${{") || SHELL_SUBSTITUTION.is_match(text)
}

/// Every storage request of a PersistentVolumeClaim or of a
/// `volumeClaimTemplates` entry anywhere in the tree.
pub fn pvc_storage_values(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_storage(value, &mut found);
    found
}

fn storage_request(value: &Value) -> Option<String> {
    let storage = get_path(value, &["spec", "resources", "requests", "storage"])?;
    if storage.is_null() {
        return None;
    }
    Some(scalar_text(storage).unwrap_or_else(|| {
        serde_yaml::to_string(storage)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }))
}

fn collect_storage(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Mapping(map) => {
            if value.get("kind").and_then(Value::as_str) == Some("PersistentVolumeClaim") {
                found.extend(storage_request(value));
            }
            for (key, child) in map {
                match (key.as_str(), child.as_sequence()) {
                    (Some("volumeClaimTemplates"), Some(items)) => {
                        found.extend(items.iter().filter_map(storage_request));
                    }
                    _ => collect_storage(child, found),
                }
            }
        }
        Value::Sequence(items) => {
            for item in items {
                collect_storage(item, found);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_storage_bytes() {
        assert_eq!(parse_storage_bytes("1Gi"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_storage_bytes("512Mi"), Some(512 * 1024 * 1024));
        assert_eq!(parse_storage_bytes(" 2 G "), Some(2_000_000_000));
        assert_eq!(parse_storage_bytes("0.5Gi"), Some(512 * 1024 * 1024));
        assert_eq!(parse_storage_bytes("100"), Some(100));
        assert_eq!(parse_storage_bytes("10Xi"), None);
        assert_eq!(parse_storage_bytes("lots"), None);
    }

    #[test]
    fn test_variable_expression() {
        assert!(has_variable_expression("${{ inputs.size }}"));
        assert!(has_variable_expression("$(STORAGE)"));
        assert!(!has_variable_expression("1Gi"));
    }

    #[test]
    fn test_pvc_and_claim_templates() {
        let v: Value = serde_yaml::from_str(
            r#"
kind: StatefulSet
spec:
  volumeClaimTemplates:
    - metadata:
        name: data
      spec:
        resources:
          requests:
            storage: 2Gi
"#,
        )
        .unwrap();
        assert_eq!(pvc_storage_values(&v), vec!["2Gi".to_string()]);

        let pvc: Value = serde_yaml::from_str(
            "kind: PersistentVolumeClaim\nspec:\n  resources:\n    requests:\n      storage: 1\n",
        )
        .unwrap();
        assert_eq!(pvc_storage_values(&pvc), vec!["1".to_string()]);
    }

    #[test]
    fn test_non_pvc_ignored() {
        let v: Value = serde_yaml::from_str(
            "kind: Pod\nspec:\n  resources:\n    requests:\n      storage: 5Gi\n",
        )
        .unwrap();
        assert!(pvc_storage_values(&v).is_empty());
    }
}
