//! R016: no-floating-tag
//!
//! Managed workloads must pin images to an explicit version or digest.
//! Floating aliases (`latest`, `stable`, ...) and bare major/minor tags
//! (`v2`, `1.4`) move under the workload and are rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{Rule, SimpleRule, image_line};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R016";
const NAME: &str = "no-floating-tag";
const DESCRIPTION: &str = "Managed app workloads must not use floating image tags.";

const FLOATING_ALIASES: [&str; 7] = ["latest", "stable", "main", "master", "edge", "nightly", "dev"];

static FLOATING_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?\d+(?:\.\d+)?$").unwrap());

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    for doc in ctx.checked_documents() {
        if !extract::is_managed_app_workload(&doc.value) {
            continue;
        }
        for (field, image) in extract::image_references(&doc.value) {
            let Some(tag) = image_tag(image).filter(|t| is_floating(t)) else {
                continue;
            };
            violations.push(Violation::new(
                CODE,
                doc.path.clone(),
                image_line(doc, field, image),
                format!(
                    "floating image tag '{}' is not allowed; use an explicit version tag (e.g. v2.2.0) or digest",
                    tag
                ),
            ));
        }
    }

    violations
}

/// Tag of an image reference. Digest-pinned and untagged references have none.
fn image_tag(image: &str) -> Option<&str> {
    let text = image.trim();
    if text.is_empty() || text.contains("@sha256:") {
        return None;
    }
    let name = text.split('@').next().unwrap_or(text);
    let last_segment = name.rsplit('/').next().unwrap_or(name);
    let (_, tag) = last_segment.rsplit_once(':')?;
    Some(tag.trim())
}

fn is_floating(tag: &str) -> bool {
    let tag = tag.trim().to_lowercase();
    FLOATING_ALIASES.contains(&tag.as_str()) || FLOATING_NUMERIC.is_match(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::doclint::rules::test_support::yaml_context;

    #[test]
    fn test_image_tag() {
        assert_eq!(image_tag("nginx:1.25.3"), Some("1.25.3"));
        assert_eq!(image_tag("registry:5000/team/app:v2"), Some("v2"));
        assert_eq!(image_tag("registry:5000/team/app"), None);
        assert_eq!(image_tag("app@sha256:abcd"), None);
        assert_eq!(image_tag("app:1.0@sha512:abcd"), Some("1.0"));
        assert_eq!(image_tag(""), None);
    }

    #[test]
    fn test_is_floating() {
        for tag in ["latest", "Stable", "main", "nightly", "v2", "2", "1.4", "v1.4"] {
            assert!(is_floating(tag), "{} should be floating", tag);
        }
        for tag in ["v2.2.0", "1.25.3", "16-alpine", "2024.01.02"] {
            assert!(!is_floating(tag), "{} should be pinned", tag);
        }
    }

    #[test]
    fn test_violations_point_at_each_image() {
        let yaml = r#"kind: Deployment
metadata:
  name: web
  annotations:
    originImageName: ghcr.io/acme/web:stable
spec:
  template:
    spec:
      containers:
        - name: web
          image: ghcr.io/acme/web:v2.2.0
        - name: cache
          image: redis:7
"#;
        let violations = check(&yaml_context(yaml));
        let found: Vec<(u32, &str)> = violations.iter().map(|v| (v.line, v.message.as_str())).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, 5);
        assert!(found[0].1.starts_with("floating image tag 'stable'"));
        assert_eq!(found[1].0, 13);
        assert!(found[1].1.starts_with("floating image tag '7'"));
    }

    #[test]
    fn test_unmanaged_ignored() {
        let yaml = "kind: Deployment\nmetadata:\n  name: web\nspec:\n  template:\n    spec:\n      containers:\n        - image: redis:latest\n";
        assert!(check(&yaml_context(yaml)).is_empty());
    }
}
