//! Narrow accessors over the dynamic YAML tree.
//!
//! Every helper returns `None` (or an empty iterator) when the shape does
//! not match. Rules decline silently on shape mismatch, so nothing here
//! ever fails.

pub mod storage;
pub mod workload;

use serde_yaml::{Mapping, Value};

pub use storage::{MAX_PVC_STORAGE_BYTES, has_variable_expression, parse_storage_bytes, pvc_storage_values};
pub use workload::{
    APP_WORKLOAD_KINDS, DEPLOY_MANAGER_LABEL, ImageField, ORIGIN_IMAGE_ANNOTATION, all_containers,
    container_str, containers, has_managed_marker, image_references, is_app_workload,
    is_managed_app_workload, template_spec,
};

/// Value under `key` when `value` is a mapping.
pub fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.as_mapping()?.get(key)
}

/// Mapping under `key`.
pub fn get_mapping<'a>(value: &'a Value, key: &str) -> Option<&'a Mapping> {
    get(value, key)?.as_mapping()
}

/// Sequence under `key`.
pub fn get_seq<'a>(value: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    get(value, key)?.as_sequence()
}

/// String under `key`.
pub fn get_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    get(value, key)?.as_str()
}

/// Follow a path of mapping keys.
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| get(current, key))
}

/// `metadata.name` as a string.
pub fn metadata_name(value: &Value) -> Option<&str> {
    get_path(value, &["metadata", "name"])?.as_str()
}

/// `metadata.labels.<key>` as a string.
pub fn label<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    get_path(value, &["metadata", "labels", key])?.as_str()
}

/// `metadata.annotations.<key>` as a string.
pub fn annotation<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    get_path(value, &["metadata", "annotations", key])?.as_str()
}

/// Trimmed, non-empty string value.
pub fn trimmed_str(value: Option<&Value>) -> Option<&str> {
    value?.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// How a `metadata.labels` entry compares with an expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
    /// Absent, empty or not a string.
    Missing,
    Mismatch,
    Match,
}

/// Compare the trimmed label `key` against `expected`.
pub fn compare_label(value: &Value, key: &str, expected: &str) -> LabelMatch {
    match trimmed_str(get_path(value, &["metadata", "labels", key])) {
        None => LabelMatch::Missing,
        Some(found) if found == expected => LabelMatch::Match,
        Some(_) => LabelMatch::Mismatch,
    }
}

/// Whether `key` appears anywhere in the tree as a mapping key.
pub fn contains_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Mapping(map) => map
            .iter()
            .any(|(k, v)| k.as_str() == Some(key) || contains_key(v, key)),
        Value::Sequence(items) => items.iter().any(|v| contains_key(v, key)),
        Value::Tagged(tagged) => contains_key(&tagged.value, key),
        _ => false,
    }
}

/// Render a scalar the way it reads in the manifest.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether the value is absent or YAML null.
pub fn is_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_path_access() {
        let v = yaml("metadata:\n  name: web\n  labels:\n    app: web\nspec: 3");
        assert_eq!(metadata_name(&v), Some("web"));
        assert_eq!(label(&v, "app"), Some("web"));
        assert_eq!(annotation(&v, "x"), None);
        assert_eq!(get_path(&v, &["spec", "template"]), None);
    }

    #[test]
    fn test_shape_mismatch_is_absent() {
        let v = yaml("metadata: [1, 2]");
        assert_eq!(metadata_name(&v), None);
        let scalar = yaml("just text");
        assert_eq!(get_str(&scalar, "kind"), None);
    }

    #[test]
    fn test_contains_key_recursive() {
        let v = yaml("spec:\n  volumes:\n    - name: cache\n      emptyDir: {}");
        assert!(contains_key(&v, "emptyDir"));
        assert!(!contains_key(&v, "hostPath"));
        let only_value = yaml("note: emptyDir");
        assert!(!contains_key(&only_value, "emptyDir"));
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&yaml("80")), Some("80".to_string()));
        assert_eq!(scalar_text(&yaml("'1Gi'")), Some("1Gi".to_string()));
        assert_eq!(scalar_text(&yaml("[1]")), None);
    }

    #[test]
    fn test_compare_label() {
        let v = yaml("metadata:\n  labels:\n    app: ' web '\n    empty: ''\n    num: 3");
        assert_eq!(compare_label(&v, "app", "web"), LabelMatch::Match);
        assert_eq!(compare_label(&v, "app", "api"), LabelMatch::Mismatch);
        assert_eq!(compare_label(&v, "empty", "web"), LabelMatch::Missing);
        assert_eq!(compare_label(&v, "num", "3"), LabelMatch::Missing);
        assert_eq!(compare_label(&v, "absent", "web"), LabelMatch::Missing);
    }

    #[test]
    fn test_is_missing() {
        let v = yaml("a: null\nb: 1");
        assert!(is_missing(get(&v, "a")));
        assert!(is_missing(get(&v, "c")));
        assert!(!is_missing(get(&v, "b")));
    }
}
