//! Workload extraction utilities.

use serde_yaml::{Mapping, Value};

use super::{get, get_mapping, get_path, get_seq};

/// Kinds treated as application workloads.
pub const APP_WORKLOAD_KINDS: [&str; 3] = ["Deployment", "StatefulSet", "DaemonSet"];

/// Label that ties a resource to the app deploy manager.
pub const DEPLOY_MANAGER_LABEL: &str = "cloud.sealos.io/app-deploy-manager";

/// Annotation recording the image the workload was generated from.
pub const ORIGIN_IMAGE_ANNOTATION: &str = "originImageName";

/// `spec.template.spec` of a workload.
pub fn template_spec(value: &Value) -> Option<&Value> {
    let spec = get_path(value, &["spec", "template", "spec"])?;
    spec.as_mapping().map(|_| spec)
}

/// Regular containers of a workload's pod template.
pub fn containers(value: &Value) -> impl Iterator<Item = &Mapping> {
    template_spec(value)
        .and_then(|spec| get_seq(spec, "containers"))
        .into_iter()
        .flatten()
        .filter_map(Value::as_mapping)
}

/// Every mapping found in a `containers` or `initContainers` list anywhere
/// in the tree.
pub fn all_containers(value: &Value) -> Vec<&Mapping> {
    let mut found = Vec::new();
    collect_containers(value, &mut found);
    found
}

fn collect_containers<'a>(value: &'a Value, found: &mut Vec<&'a Mapping>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                if matches!(key.as_str(), Some("containers" | "initContainers")) {
                    if let Some(items) = child.as_sequence() {
                        found.extend(items.iter().filter_map(Value::as_mapping));
                    }
                }
                collect_containers(child, found);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                collect_containers(item, found);
            }
        }
        _ => {}
    }
}

/// Non-empty, trimmed string field of a container.
pub fn container_str<'a>(container: &'a Mapping, key: &str) -> Option<&'a str> {
    container
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Where an image reference was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageField {
    /// `metadata.annotations.originImageName`
    Origin,
    /// `image` of a regular container
    Container,
}

/// The origin annotation followed by every regular container image,
/// trimmed and non-empty.
pub fn image_references(value: &Value) -> Vec<(ImageField, &str)> {
    let origin = get_path(value, &["metadata", "annotations", ORIGIN_IMAGE_ANNOTATION])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| (ImageField::Origin, s));
    origin
        .into_iter()
        .chain(containers(value).filter_map(|c| container_str(c, "image")).map(|s| (ImageField::Container, s)))
        .collect()
}

/// Deployment, StatefulSet or DaemonSet with at least one container.
pub fn is_app_workload(value: &Value) -> bool {
    let kind = get(value, "kind").and_then(Value::as_str);
    if !matches!(kind, Some(k) if APP_WORKLOAD_KINDS.contains(&k)) {
        return false;
    }
    template_spec(value)
        .and_then(|spec| get_seq(spec, "containers"))
        .map(|c| !c.is_empty())
        .unwrap_or(false)
}

/// Carries the deploy-manager label or the origin image annotation.
pub fn has_managed_marker(value: &Value) -> bool {
    let has_key = |section: &str, key: &str| {
        get_mapping(value, "metadata")
            .and_then(|meta| meta.get(section))
            .and_then(Value::as_mapping)
            .map(|m| m.contains_key(key))
            .unwrap_or(false)
    };
    has_key("labels", DEPLOY_MANAGER_LABEL) || has_key("annotations", ORIGIN_IMAGE_ANNOTATION)
}

/// An app workload owned by the deploy manager.
pub fn is_managed_app_workload(value: &Value) -> bool {
    is_app_workload(value) && has_managed_marker(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    const MANAGED: &str = r#"
kind: Deployment
metadata:
  name: web
  labels:
    cloud.sealos.io/app-deploy-manager: web
spec:
  template:
    spec:
      initContainers:
        - name: init
          image: busybox:1.36
      containers:
        - name: web
          image: nginx:1.25
"#;

    #[test]
    fn test_managed_workload() {
        let v = yaml(MANAGED);
        assert!(is_app_workload(&v));
        assert!(has_managed_marker(&v));
        assert!(is_managed_app_workload(&v));
        assert_eq!(containers(&v).count(), 1);
        assert_eq!(all_containers(&v).len(), 2);
    }

    #[test]
    fn test_image_references() {
        let mut v = yaml(MANAGED);
        assert_eq!(image_references(&v), vec![(ImageField::Container, "nginx:1.25")]);

        v["metadata"]["annotations"] = yaml("originImageName: ' nginx:1.25 '");
        assert_eq!(
            image_references(&v),
            vec![(ImageField::Origin, "nginx:1.25"), (ImageField::Container, "nginx:1.25")]
        );
    }

    #[test]
    fn test_annotation_marker() {
        let v = yaml("metadata:\n  annotations:\n    originImageName: nginx:1.25");
        assert!(has_managed_marker(&v));
    }

    #[test]
    fn test_not_app_workload() {
        assert!(!is_app_workload(&yaml("kind: Job\nspec:\n  template:\n    spec:\n      containers: [{name: a}]")));
        assert!(!is_app_workload(&yaml("kind: Deployment\nspec:\n  template:\n    spec:\n      containers: []")));
        assert!(!is_app_workload(&yaml("kind: Deployment\nspec: broken")));
    }

    #[test]
    fn test_container_str_trims() {
        let v = yaml("spec:\n  template:\n    spec:\n      containers:\n        - name: '  web '\n          image: ''");
        let c = containers(&v).next().unwrap();
        assert_eq!(container_str(c, "name"), Some("web"));
        assert_eq!(container_str(c, "image"), None);
    }
}
