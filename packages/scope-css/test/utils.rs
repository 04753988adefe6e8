//! Scope Transform Test Utils

use scope_css::css::{parser, serializer, Stylesheet};
use scope_css::{apply, ScopeConfig};

pub fn parse(css: &str) -> Stylesheet {
    parser::parse(css).expect("test stylesheet should parse")
}

/// Parse, scope under `selector` and print again.
pub fn scope(css: &str, selector: &str) -> String {
    let mut stylesheet = parse(css);
    apply(&mut stylesheet, &ScopeConfig::new(selector));
    serializer::serialize(&stylesheet)
}
