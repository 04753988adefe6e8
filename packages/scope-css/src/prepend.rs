//! Selector Scoping Transform
//!
//! Rewrites every selector in a rule tree to sit beneath a fixed ancestor
//! selector, so the stylesheet only applies inside that container element.
//! Keyframe step selectors (`from`, `to`, percentages) are left alone, and a
//! selector that already starts with the scope is skipped, which makes the
//! transform idempotent and gives authors a hard-coded opt-out.

use crate::css::Stylesheet;
use once_cell::sync::Lazy;
use regex::Regex;

/// Selectors that are only meaningful inside `@keyframes` blocks: a
/// percentage, or exactly `from` or `to`.
static KEYFRAME_SELECTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]*[.])?[0-9]+%$|^from$|^to$").unwrap());

/// The scope selector prepended to every rule.
///
/// The configured value is concatenated in front of each selector verbatim,
/// so it carries its own trailing separator (normally a single space, the
/// descendant combinator); the transform itself never inserts one. The
/// trimmed value is what emptiness and already-scoped checks use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeConfig {
    selector: String,
}

impl ScopeConfig {
    pub fn new(selector: impl Into<String>) -> Self {
        ScopeConfig {
            selector: selector.into(),
        }
    }

    /// The configured scope prefix, trailing separator included.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// An empty or whitespace-only scope turns the transform off.
    pub fn is_disabled(&self) -> bool {
        self.selector.trim().is_empty()
    }
}

/// Scope every rule of `stylesheet` in place. A disabled config leaves the
/// tree untouched.
pub fn apply(stylesheet: &mut Stylesheet, config: &ScopeConfig) {
    if config.is_disabled() {
        return;
    }
    let mut rewritten = 0usize;
    stylesheet.walk_rules_mut(&mut |rule| {
        let selectors: Vec<String> = rule
            .selectors()
            .into_iter()
            .map(|selector| rewrite_selector(&selector, config))
            .collect();
        rule.set_selectors(&selectors);
        rewritten += 1;
    });
    log::trace!(
        "scoped {} rule(s) under `{}`",
        rewritten,
        config.selector.trim()
    );
}

/// Rewrite a single selector under the configured scope.
pub fn rewrite_selector(selector: &str, config: &ScopeConfig) -> String {
    let trimmed_scope = config.selector.trim();
    if trimmed_scope.is_empty() {
        return selector.to_string();
    }
    if is_keyframe_selector(selector) {
        // Skip keyframe steps
        return selector.to_string();
    }
    if selector.starts_with(trimmed_scope) {
        // Skip selectors with the scope already hard-coded
        return selector.to_string();
    }
    format!("{}{}", config.selector, selector)
}

/// Whether `selector` is a keyframe step (`0%`, `53.5%`, `from`, `to`).
pub fn is_keyframe_selector(selector: &str) -> bool {
    KEYFRAME_SELECTOR_RE.is_match(selector)
}
