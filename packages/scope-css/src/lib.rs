#![deny(clippy::all)]

/**
 * Scoped CSS Core
 *
 * Rule tree, CSS parser/serializer and the selector-scoping transform.
 */
pub mod css;
pub mod prepend;
mod version;

pub use css::{CssEngine, DefaultEngine};
pub use prepend::{apply, is_keyframe_selector, rewrite_selector, ScopeConfig};
pub use version::VERSION;
