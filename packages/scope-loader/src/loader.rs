//! Scope Loader
//!
//! The pipeline stage around the scoping transform. One invocation receives
//! the upstream stage's output (text, optional source map, opaque metadata),
//! decides via the file-match predicate whether the transform applies, and
//! forwards the result downstream. It either completes the whole file or
//! fails; there is no partial output.

use crate::matcher::matches_file;
use crate::options::{OptionsError, RawOptions, ScopeLoaderOptions};
use crate::source_map::{self, SourceMap};
use scope_css::css::CssParseError;
use scope_css::{prepend, CssEngine, DefaultEngine, ScopeConfig};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopeLoaderError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] OptionsError),
    #[error("scope loader cannot be the first stage in the pipeline")]
    FirstStage,
    #[error("failed to parse stylesheet: {0}")]
    Css(#[from] CssParseError),
}

/// Where in the pipeline this invocation sits.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Path of the file being processed; drives pattern matching and
    /// source-map paths.
    pub resource_path: PathBuf,
    /// Zero-based position of this stage in its pipeline. The loader
    /// consumes upstream output, so index 0 is rejected.
    pub stage_index: usize,
}

impl StageContext {
    pub fn new(resource_path: impl Into<PathBuf>, stage_index: usize) -> Self {
        StageContext {
            resource_path: resource_path.into(),
            stage_index,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StageInput {
    pub source: String,
    pub source_map: Option<SourceMap>,
    /// Opaque metadata from earlier stages, forwarded untouched.
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub source: String,
    pub source_map: Option<SourceMap>,
    pub meta: Option<serde_json::Value>,
}

pub struct ScopeLoader<E: CssEngine = DefaultEngine> {
    options: ScopeLoaderOptions,
    engine: E,
}

impl ScopeLoader {
    pub fn new(options: ScopeLoaderOptions) -> Self {
        ScopeLoader {
            options,
            engine: DefaultEngine,
        }
    }

    pub fn from_raw(raw: RawOptions) -> Result<Self, ScopeLoaderError> {
        Ok(Self::new(ScopeLoaderOptions::from_raw(raw)?))
    }

    pub fn from_json(json: &str) -> Result<Self, ScopeLoaderError> {
        Ok(Self::new(ScopeLoaderOptions::from_json(json)?))
    }
}

impl<E: CssEngine> ScopeLoader<E> {
    /// Run with a caller-provided CSS engine instead of the built-in one.
    pub fn with_engine(options: ScopeLoaderOptions, engine: E) -> Self {
        ScopeLoader { options, engine }
    }

    pub fn options(&self) -> &ScopeLoaderOptions {
        &self.options
    }

    pub fn run(
        &self,
        context: &StageContext,
        input: StageInput,
    ) -> Result<StageOutput, ScopeLoaderError> {
        if context.stage_index == 0 {
            return Err(ScopeLoaderError::FirstStage);
        }

        if !matches_file(&self.options.files, &context.resource_path) {
            log::debug!(
                "{}: no file pattern matched, passing through",
                context.resource_path.display()
            );
            return Ok(StageOutput {
                source: input.source,
                source_map: input.source_map,
                meta: input.meta,
            });
        }

        let mut stylesheet = self.engine.parse(&input.source)?;
        let config = ScopeConfig::new(format!("{} ", self.options.selector));
        prepend::apply(&mut stylesheet, &config);

        if !self.options.source_map {
            return Ok(StageOutput {
                source: self.engine.serialize(&stylesheet),
                source_map: None,
                meta: input.meta,
            });
        }

        let (source, delta) = source_map::serialize_with_map(
            &self.engine,
            &stylesheet,
            &context.resource_path,
            &input.source,
        );
        let mut map = match &input.source_map {
            Some(original) => source_map::extend_source_map(original, &delta),
            None => delta,
        };
        if let Ok(cwd) = std::env::current_dir() {
            source_map::absolutize(&mut map, &cwd);
        }
        Ok(StageOutput {
            source,
            source_map: Some(map),
            meta: input.meta,
        })
    }
}
