//! Multi-document splitting and YAML parsing for source blocks.

use std::fmt;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::de::{self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

use super::SourceBlock;
use super::markdown::trim_blank_edges;
use crate::analyzer::doclint::types::{PARSE_RULE_ID, Violation};

static DOCUMENT_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*---\s*$").unwrap());

/// Template control lines that make a snippet unparseable on purpose.
const TEMPLATE_CONTROL_PREFIXES: [&str; 4] = [
    "${{ if(",
    "${{ elif(",
    "${{ else() }}",
    "${{ endif() }}",
];

/// One YAML document split out of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    /// Absolute line of the first line of `text`.
    pub start_line: u32,
    pub text: String,
}

/// Result of parsing one document.
#[derive(Debug)]
pub enum ParseOutcome {
    /// A non-null YAML value.
    Parsed(DocumentText, Value),
    /// Malformed YAML that must be reported.
    Invalid(Violation),
    /// Empty document or tolerated parse failure.
    Dropped,
}

/// Split a block on bare `---` lines, tracking absolute start lines.
pub fn split_documents(block: &SourceBlock) -> Vec<DocumentText> {
    let mut docs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut doc_start = block.start_line;

    for (offset, line) in block.raw_text.lines().enumerate() {
        let line_no = block.start_line + offset as u32;
        if DOCUMENT_SEPARATOR.is_match(line) {
            push_document(&mut docs, doc_start, &current);
            current.clear();
            doc_start = line_no + 1;
            continue;
        }
        current.push(line);
    }
    push_document(&mut docs, doc_start, &current);

    docs
}

fn push_document(docs: &mut Vec<DocumentText>, doc_start: u32, lines: &[&str]) {
    if let Some((offset, body)) = trim_blank_edges(lines) {
        docs.push(DocumentText {
            start_line: doc_start + offset as u32,
            text: body.join("\n"),
        });
    }
}

/// Whether a parse failure in `text` is expected and must stay silent.
pub fn is_tolerated_failure(text: &str) -> bool {
    text.lines().map(str::trim).any(|line| {
        line == "..."
            || TEMPLATE_CONTROL_PREFIXES
                .iter()
                .any(|prefix| line.starts_with(prefix))
    })
}

/// Parse one document of a block.
pub fn parse_document(block: &SourceBlock, doc: DocumentText) -> ParseOutcome {
    match load(&doc.text) {
        Ok(Value::Null) => ParseOutcome::Dropped,
        Ok(value) => ParseOutcome::Parsed(doc, value),
        Err(err) => {
            if block.skip_checks || is_tolerated_failure(&doc.text) {
                debug!(
                    "{}:{}: tolerated YAML error: {}",
                    block.path.display(),
                    doc.start_line,
                    err
                );
                return ParseOutcome::Dropped;
            }
            let line = doc.start_line
                + err
                    .location()
                    .map(|loc| loc.line().saturating_sub(1) as u32)
                    .unwrap_or(0);
            ParseOutcome::Invalid(Violation::new(
                PARSE_RULE_ID,
                block.path.clone(),
                line,
                format!("invalid YAML snippet: {}", error_summary(&err)),
            ))
        }
    }
}

/// Load one document. Repeated keys keep their last value and `<<` merge
/// keys are expanded.
fn load(text: &str) -> Result<Value, serde_yaml::Error> {
    let LastWins(mut value) = serde_yaml::from_str(text)?;
    value.apply_merge()?;
    Ok(value)
}

/// A YAML value whose mappings let a repeated key overwrite earlier ones.
struct LastWins(Value);

impl<'de> Deserialize<'de> for LastWins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LastWinsVisitor).map(LastWins)
    }
}

struct LastWinsVisitor;

impl<'de> Visitor<'de> for LastWinsVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        LastWins::deserialize(deserializer).map(|v| v.0)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(LastWins(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut mapping = Mapping::new();
        while let Some((LastWins(key), LastWins(value))) = map.next_entry()? {
            mapping.insert(key, value);
        }
        Ok(Value::Mapping(mapping))
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Value, A::Error> {
        let (tag, contents): (String, _) = data.variant()?;
        let LastWins(value) = contents.newtype_variant()?;
        if tag.trim_start_matches('!').is_empty() {
            return Ok(value);
        }
        Ok(Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(tag),
            value,
        })))
    }
}

/// Split and parse every document of a block.
pub fn parse_block(block: &SourceBlock) -> Vec<ParseOutcome> {
    split_documents(block)
        .into_iter()
        .map(|doc| parse_document(block, doc))
        .collect()
}

/// First clause of the parser message, without the position suffix.
fn error_summary(err: &serde_yaml::Error) -> String {
    let message = err.to_string();
    let head = message.split(" at line ").next().unwrap_or(&message);
    head.trim().to_string()
}
