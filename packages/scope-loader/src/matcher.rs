//! File-Match Predicate
//!
//! Decides, before any parsing happens, whether a file path is one the scope
//! loader applies to.

use crate::options::FilePattern;
use std::path::Path;

/// True when `path` contains any literal pattern as a substring or matches
/// any regex pattern. An empty pattern list matches nothing.
pub fn matches_file(patterns: &[FilePattern], path: &Path) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let path_text = path.to_string_lossy();
    patterns.iter().any(|pattern| match pattern {
        FilePattern::Literal(literal) => path_text.contains(literal.as_str()),
        FilePattern::Pattern(regex) => regex.is_match(&path_text),
    })
}
