//! R001: no-latest-tag
//!
//! Text rule: any `image:` or `originImageName:` line pinned to `:latest`.
//! Works on raw lines so it also catches values the YAML tree would hide,
//! such as images inside multi-line strings.

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::rules::{Rule, SimpleRule};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R001";
const NAME: &str = "no-latest-tag";
const DESCRIPTION: &str = "Image references must not use the ':latest' tag.";

static LATEST_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:image|originImageName)\s*:\s*['"]?[^#\s'"]*:latest\b"#).unwrap()
});

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    ctx.checked_documents()
        .flat_map(|doc| {
            doc.numbered_lines()
                .filter(|(_, line)| LATEST_IMAGE.is_match(line))
                .map(|(line_no, _)| {
                    Violation::new(CODE, doc.path.clone(), line_no, "forbidden ':latest' image tag")
                })
        })
        .collect()
}
