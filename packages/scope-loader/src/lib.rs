#![deny(clippy::all)]

/**
 * Scope Loader
 *
 * Pipeline adapter around the scoped-CSS core: options, file matching,
 * the pipeline stage itself and source-map propagation.
 */
// Re-export the core for convenience
pub use scope_css as core;

pub mod loader;
pub mod matcher;
pub mod options;
pub mod source_map;

pub use loader::{ScopeLoader, ScopeLoaderError, StageContext, StageInput, StageOutput};
pub use matcher::matches_file;
pub use options::{
    FilePattern, OptionsError, RawFilePattern, RawOptions, ScopeLoaderOptions, DEFAULT_SELECTOR,
};
pub use source_map::{extend_source_map, SourceMap, SourceMapGenerator};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(feature = "napi-bindings")]
use napi_derive::napi;

/// Result handed back to Node callers.
#[cfg(feature = "napi-bindings")]
#[napi(object)]
pub struct ScopeResult {
    pub css: String,
    /// Serialized source map JSON, when source maps are enabled.
    pub map: Option<String>,
}

/// Run the scope loader over one stylesheet. `options_json` takes the same
/// shape as the JSON options file; omitted fields fall back to defaults.
#[cfg(feature = "napi-bindings")]
#[napi]
pub fn scope_stylesheet(
    css: String,
    resource_path: String,
    options_json: Option<String>,
) -> napi::Result<ScopeResult> {
    let options = match options_json {
        Some(json) => ScopeLoaderOptions::from_json(&json),
        None => Ok(ScopeLoaderOptions::default()),
    }
    .map_err(|err| napi::Error::from_reason(err.to_string()))?;

    let loader = ScopeLoader::new(options);
    let context = StageContext::new(resource_path, 1);
    let output = loader
        .run(
            &context,
            StageInput {
                source: css,
                source_map: None,
                meta: None,
            },
        )
        .map_err(|err| napi::Error::from_reason(err.to_string()))?;

    let map = match &output.source_map {
        Some(map) => Some(
            serde_json::to_string(map)
                .map_err(|err| napi::Error::from_reason(err.to_string()))?,
        ),
        None => None,
    };
    Ok(ScopeResult {
        css: output.source,
        map,
    })
}
