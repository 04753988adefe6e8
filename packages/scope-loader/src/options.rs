//! Loader Options
//!
//! Caller-supplied configuration for the scope loader. Options arrive either
//! as typed values or as JSON (the shape a bundler config would carry); the
//! JSON form is validated here — unknown fields, wrong types and
//! uncompilable regex patterns are all configuration errors, rejected before
//! any stylesheet is touched.

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Scope selector used when the caller does not configure one. The adapter
/// appends the separating space when it builds the effective scope prefix.
pub const DEFAULT_SELECTOR: &str = ".editor-block-list__block";

/// One entry of the `files` option.
#[derive(Debug, Clone)]
pub enum FilePattern {
    /// Matches any path containing this text.
    Literal(String),
    /// Matches any path the regex matches.
    Pattern(Regex),
}

impl FilePattern {
    pub fn literal(value: impl Into<String>) -> Self {
        FilePattern::Literal(value.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, OptionsError> {
        Regex::new(pattern)
            .map(FilePattern::Pattern)
            .map_err(|source| OptionsError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid options: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("invalid file pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Options as they deserialize from JSON. `files` entries are either plain
/// strings (literal patterns) or `{"regex": "…"}` objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOptions {
    pub files: Vec<RawFilePattern>,
    pub selector: String,
    pub source_map: bool,
}

impl Default for RawOptions {
    fn default() -> Self {
        RawOptions {
            files: Vec::new(),
            selector: DEFAULT_SELECTOR.to_string(),
            source_map: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFilePattern {
    Literal(String),
    Pattern { regex: String },
}

/// Validated loader options.
#[derive(Debug, Clone)]
pub struct ScopeLoaderOptions {
    /// File patterns the loader applies to; an empty list matches nothing,
    /// so every stylesheet passes through untouched.
    pub files: Vec<FilePattern>,
    /// Scope selector, without the trailing separator.
    pub selector: String,
    /// Whether to compute and propagate source maps.
    pub source_map: bool,
}

impl Default for ScopeLoaderOptions {
    fn default() -> Self {
        ScopeLoaderOptions {
            files: Vec::new(),
            selector: DEFAULT_SELECTOR.to_string(),
            source_map: false,
        }
    }
}

impl ScopeLoaderOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let raw: RawOptions = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, OptionsError> {
        let raw: RawOptions = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    /// Compile raw options, turning each regex entry into a real matcher.
    pub fn from_raw(raw: RawOptions) -> Result<Self, OptionsError> {
        let mut files = Vec::with_capacity(raw.files.len());
        for pattern in raw.files {
            files.push(match pattern {
                RawFilePattern::Literal(value) => FilePattern::Literal(value),
                RawFilePattern::Pattern { regex } => FilePattern::regex(&regex)?,
            });
        }
        Ok(ScopeLoaderOptions {
            files,
            selector: raw.selector,
            source_map: raw.source_map,
        })
    }
}
