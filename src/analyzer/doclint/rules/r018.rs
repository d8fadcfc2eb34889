//! R018: no-compose-variables
//!
//! Compose-style `$VAR` / `${VAR}` references must be resolved before an
//! image lands in a managed workload.

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::doclint::context::ScanContext;
use crate::analyzer::doclint::extract;
use crate::analyzer::doclint::rules::{Rule, SimpleRule, image_line};
use crate::analyzer::doclint::types::Violation;

const CODE: &str = "R018";
const NAME: &str = "no-compose-variables";
const DESCRIPTION: &str = "Managed app workload images must not contain Compose-style variables.";

static COMPOSE_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\{[^}]+\}|[A-Za-z_][A-Za-z0-9_]*)").unwrap());

pub fn rule() -> impl Rule {
    SimpleRule::new(CODE, NAME, DESCRIPTION, check)
}

fn check(ctx: &ScanContext) -> Vec<Violation> {
    ctx.checked_documents()
        .filter(|doc| extract::is_managed_app_workload(&doc.value))
        .flat_map(|doc| {
            extract::image_references(&doc.value)
                .into_iter()
                .filter(|(_, image)| COMPOSE_VARIABLE.is_match(image))
                .map(move |(field, image)| {
                    Violation::new(
                        CODE,
                        doc.path.clone(),
                        image_line(doc, field, image),
                        "image references must be concrete and must not contain Compose-style variables; \
                         resolve to explicit tag or digest before emitting template artifacts",
                    )
                })
        })
        .collect()
}
