//! Line locator: maps a key or regex pattern to an absolute source line.
//!
//! Lookups resolve in two tiers:
//! 1. Patterns of the form `^\s*KEY\s*:` hit a key index built once at
//!    construction (first occurrence of each key wins); a miss falls
//!    through to the scan.
//! 2. Any other pattern is compiled and scanned over the document lines.
//!
//! Every result, including "not found", is cached per pattern.

use std::collections::HashMap;
use std::sync::LazyLock;

use log::{trace, warn};
use parking_lot::Mutex;
use regex::Regex;

/// Shape of a line that declares a simple key.
static KEY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9_.\-/]+)\s*:").unwrap());

/// A pattern that only asks for `^\s*KEY\s*:` (optionally `$`-anchored).
/// A `.` in KEY must be escaped; a bare `.` is a wildcard.
static SIMPLE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\^\\s\*((?:[A-Za-z0-9_\-/]|\\[A-Za-z0-9_.\-/])+)\\s\*:\$?$").unwrap()
});

static REGEX_ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\(.)").unwrap());

/// Index over one document's lines.
#[derive(Debug)]
pub struct LineLocator {
    start_line: u32,
    lines: Vec<String>,
    key_index: HashMap<String, u32>,
    cache: Mutex<HashMap<String, Option<u32>>>,
}

impl LineLocator {
    /// Build a locator for `text`, whose first line is `start_line`.
    pub fn new(start_line: u32, text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let mut key_index = HashMap::new();
        for (offset, line) in lines.iter().enumerate() {
            if let Some(caps) = KEY_LINE.captures(line) {
                key_index
                    .entry(caps[1].to_string())
                    .or_insert(start_line + offset as u32);
            }
        }
        Self {
            start_line,
            lines,
            key_index,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// First line of the document.
    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    /// The document's lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Resolve `pattern` to an absolute line, or `default` (falling back to
    /// the document start) when nothing matches.
    pub fn find(&self, pattern: &str, default: Option<u32>) -> u32 {
        self.lookup(pattern)
            .unwrap_or_else(|| default.unwrap_or(self.start_line))
    }

    /// Resolve `pattern` to an absolute line, or `None`.
    pub fn lookup(&self, pattern: &str) -> Option<u32> {
        if let Some(cached) = self.cache.lock().get(pattern) {
            trace!("locator cache hit: {}", pattern);
            return *cached;
        }

        let resolved = match simple_key(pattern) {
            Some(key) => self
                .key_index
                .get(&key)
                .copied()
                .or_else(|| self.scan(pattern)),
            None => self.scan(pattern),
        };
        self.cache.lock().insert(pattern.to_string(), resolved);
        resolved
    }

    fn scan(&self, pattern: &str) -> Option<u32> {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!("invalid locator pattern {:?}: {}", pattern, e);
                return None;
            }
        };
        self.lines
            .iter()
            .position(|line| re.is_match(line))
            .map(|offset| self.start_line + offset as u32)
    }

    #[cfg(test)]
    fn cached_patterns(&self) -> usize {
        self.cache.lock().len()
    }
}

/// Extract the literal key of a `^\s*KEY\s*:` pattern.
fn simple_key(pattern: &str) -> Option<String> {
    let caps = SIMPLE_KEY_PATTERN.captures(pattern)?;
    Some(REGEX_ESCAPE.replace_all(&caps[1], "$1").into_owned())
}
