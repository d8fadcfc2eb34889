//! Fenced YAML block extraction from Markdown.
//!
//! A small two-state scanner: outside a block it looks for a fence opener
//! whose info string starts with `yaml`/`yml`; inside a block it collects
//! lines until the next fence. Extraction never fails. An unterminated
//! fence at end of file produces no block.

use std::path::Path;

use log::trace;

use super::SourceBlock;

/// Literal markers that flag an example as intentionally wrong.
pub const NEGATIVE_MARKERS: [&str; 4] = ["错误示例", "wrong example", "❌", "invalid example"];

/// Lines before the fence opener inspected for a negative marker.
const CONTEXT_LINES: usize = 3;

const FENCE: &str = "```";

/// Whether `text` carries a negative-example marker (case-insensitive).
pub fn has_negative_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    NEGATIVE_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Info-string language of a fence opener, lowercased.
fn fence_language(trimmed: &str) -> Option<String> {
    let info = trimmed.strip_prefix(FENCE)?.trim();
    info.split_whitespace().next().map(str::to_lowercase)
}

enum State {
    Outside,
    Inside {
        start_line: u32,
        skip_checks: bool,
        collected: Vec<String>,
    },
}

/// Extract every ```yaml / ```yml block from a Markdown document.
pub fn extract_blocks(path: &Path, text: &str) -> Vec<SourceBlock> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut state = State::Outside;

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        match &mut state {
            State::Outside => {
                if !trimmed.starts_with(FENCE) {
                    continue;
                }
                if !matches!(fence_language(trimmed).as_deref(), Some("yaml" | "yml")) {
                    continue;
                }
                // The opener itself counts as context (`` ```yaml ❌ ``).
                let from = idx.saturating_sub(CONTEXT_LINES);
                let context = lines[from..=idx].join("\n");
                state = State::Inside {
                    start_line: idx as u32 + 2,
                    skip_checks: has_negative_marker(&context),
                    collected: Vec::new(),
                };
            }
            State::Inside {
                start_line,
                skip_checks,
                collected,
            } => {
                if !trimmed.starts_with(FENCE) {
                    collected.push((*line).to_string());
                    continue;
                }
                if let Some(block) = finish_block(path, *start_line, *skip_checks, collected) {
                    blocks.push(block);
                }
                state = State::Outside;
            }
        }
    }

    trace!("{}: {} yaml block(s)", path.display(), blocks.len());
    blocks
}

fn finish_block(
    path: &Path,
    start_line: u32,
    skip_checks: bool,
    collected: &[String],
) -> Option<SourceBlock> {
    let (offset, body) = trim_blank_edges(collected)?;
    let raw_text = body.join("\n");
    let skip_checks = skip_checks || has_negative_marker(&raw_text);
    Some(SourceBlock {
        path: path.to_path_buf(),
        start_line: start_line + offset as u32,
        raw_text,
        skip_checks,
    })
}

/// Drop leading and trailing blank lines. Returns the number of leading
/// lines removed with the remaining slice, or `None` when nothing is left.
pub(crate) fn trim_blank_edges<S: AsRef<str>>(lines: &[S]) -> Option<(usize, &[S])> {
    let first = lines.iter().position(|l| !l.as_ref().trim().is_empty())?;
    let last = lines.iter().rposition(|l| !l.as_ref().trim().is_empty())?;
    Some((first, &lines[first..=last]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<SourceBlock> {
        extract_blocks(Path::new("doc.md"), text)
    }

    #[test]
    fn test_single_block() {
        let text = "# Title\n\n```yaml\nkind: Service\nmetadata:\n  name: web\n```\n";
        let blocks = extract(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 4);
        assert_eq!(blocks[0].raw_text, "kind: Service\nmetadata:\n  name: web");
        assert!(!blocks[0].skip_checks);
    }

    #[test]
    fn test_yml_tag_and_info_string() {
        let text = "```YML title=\"x\"\na: 1\n```\n```json\n{}\n```\n```\nb: 2\n```\n";
        let blocks = extract(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].raw_text, "a: 1");
    }

    #[test]
    fn test_indented_fence() {
        let text = "- step\n  ```yaml\n  a: 1\n  ```\n";
        let blocks = extract(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 3);
    }

    #[test]
    fn test_blank_edges_shift_start_line() {
        let text = "```yaml\n\n\na: 1\n\n```\n";
        let blocks = extract(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 4);
        assert_eq!(blocks[0].raw_text, "a: 1");
    }

    #[test]
    fn test_empty_block_discarded() {
        let text = "```yaml\n\n   \n```\n";
        assert!(extract(text).is_empty());
    }

    #[test]
    fn test_unterminated_fence_dropped() {
        let text = "```yaml\na: 1\n```\n```yaml\nb: 2\n";
        let blocks = extract(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].raw_text, "a: 1");
    }

    #[test]
    fn test_marker_in_preceding_context() {
        let text = "Wrong Example: do not copy\n\n\n```yaml\nimage: nginx:latest\n```\n";
        let blocks = extract(text);
        assert!(blocks[0].skip_checks);
    }

    #[test]
    fn test_marker_outside_context_window() {
        let text = "wrong example\n\n\n\n```yaml\nimage: nginx:latest\n```\n";
        let blocks = extract(text);
        assert!(!blocks[0].skip_checks);
    }

    #[test]
    fn test_marker_on_opener_line() {
        let text = "```yaml ❌\na: 1\n```\n";
        assert!(extract(text)[0].skip_checks);
    }

    #[test]
    fn test_marker_in_body() {
        let text = "```yaml\n# 错误示例\na: 1\n```\n";
        assert!(extract(text)[0].skip_checks);
    }

    #[test]
    fn test_skip_does_not_leak_to_next_block() {
        let text = "invalid example\n```yaml\na: 1\n```\n\n\n\n\n```yaml\nb: 2\n```\n";
        let blocks = extract(text);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].skip_checks);
        assert!(!blocks[1].skip_checks);
    }

    #[test]
    fn test_markers_are_literal() {
        assert!(has_negative_marker("This is a WRONG EXAMPLE"));
        assert!(!has_negative_marker("bad example"));
        assert!(!has_negative_marker("wrong-example"));
    }
}
