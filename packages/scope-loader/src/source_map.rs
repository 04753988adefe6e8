//! Source Maps
//!
//! Version-3 source-map support for the scope loader: emitting a map for the
//! rewrite, composing it over whatever map arrived from the previous pipeline
//! stage, and rewriting map paths to absolute form before the result moves
//! downstream.

// https://docs.google.com/document/d/1U1RGAehQwRypUTovF1KRlpiOFze0b-_2gc6fAH0KY0k/edit
const VERSION: u32 = 3;

use indexmap::IndexMap;
use scope_css::css::{CssEngine, Position, PositionObserver, Stylesheet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(
        rename = "sourceRoot",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(
        rename = "sourcesContent",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sources_content: Vec<Option<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    pub mappings: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceMapError {
    #[error("a line must be added before mappings can be added")]
    NoLine,
    #[error("unknown source file \"{0}\"")]
    UnknownSource(String),
    #[error("mappings must be added in output order")]
    OutOfOrder,
    #[error("the source location must be provided when a source url is provided")]
    MissingLocation,
}

#[derive(Debug, Clone)]
struct Segment {
    col0: usize,
    source_url: Option<String>,
    source_line0: Option<usize>,
    source_col0: Option<usize>,
}

pub struct SourceMapGenerator {
    file: Option<String>,
    sources_content: IndexMap<String, Option<String>>,
    lines: Vec<Vec<Segment>>,
    last_col0: usize,
    has_mappings: bool,
}

impl SourceMapGenerator {
    pub fn new(file: Option<String>) -> Self {
        SourceMapGenerator {
            file,
            sources_content: IndexMap::new(),
            lines: Vec::new(),
            last_col0: 0,
            has_mappings: false,
        }
    }

    /// The content is `None` when it is expected to be loaded using the URL.
    pub fn add_source(&mut self, url: String, content: Option<String>) -> &mut Self {
        self.sources_content.entry(url).or_insert(content);
        self
    }

    pub fn add_line(&mut self) -> &mut Self {
        self.lines.push(Vec::new());
        self.last_col0 = 0;
        self
    }

    pub fn add_mapping(
        &mut self,
        col0: usize,
        source_url: Option<String>,
        source_line0: Option<usize>,
        source_col0: Option<usize>,
    ) -> Result<&mut Self, SourceMapError> {
        if self.lines.is_empty() {
            return Err(SourceMapError::NoLine);
        }
        if let Some(url) = &source_url {
            if !self.sources_content.contains_key(url) {
                return Err(SourceMapError::UnknownSource(url.clone()));
            }
        }
        if col0 < self.last_col0 {
            return Err(SourceMapError::OutOfOrder);
        }
        if source_url.is_some() && (source_line0.is_none() || source_col0.is_none()) {
            return Err(SourceMapError::MissingLocation);
        }

        self.has_mappings = true;
        self.last_col0 = col0;
        if let Some(line) = self.lines.last_mut() {
            line.push(Segment {
                col0,
                source_url,
                source_line0,
                source_col0,
            });
        }
        Ok(self)
    }

    pub fn to_json(&self) -> Option<SourceMap> {
        if !self.has_mappings {
            return None;
        }

        let sources: Vec<String> = self.sources_content.keys().cloned().collect();
        let sources_content: Vec<Option<String>> =
            self.sources_content.values().cloned().collect();

        let mut mappings = String::new();
        let mut last_source_index = 0i64;
        let mut last_source_line0 = 0i64;
        let mut last_source_col0 = 0i64;

        for (line_index, segments) in self.lines.iter().enumerate() {
            if line_index > 0 {
                mappings.push(';');
            }
            let mut last_col0 = 0i64;
            let mut first = true;
            for segment in segments {
                if !first {
                    mappings.push(',');
                }
                first = false;

                // zero-based starting column of the line in the generated code
                mappings.push_str(&to_base64_vlq(segment.col0 as i64 - last_col0));
                last_col0 = segment.col0 as i64;

                if let Some(source_url) = &segment.source_url {
                    // zero-based index into the "sources" list
                    let source_index =
                        self.sources_content.get_index_of(source_url).unwrap_or(0) as i64;
                    mappings.push_str(&to_base64_vlq(source_index - last_source_index));
                    last_source_index = source_index;

                    // zero-based starting line in the original source
                    let line0 = segment.source_line0.unwrap_or(0) as i64;
                    mappings.push_str(&to_base64_vlq(line0 - last_source_line0));
                    last_source_line0 = line0;

                    // zero-based starting column in the original source
                    let col0 = segment.source_col0.unwrap_or(0) as i64;
                    mappings.push_str(&to_base64_vlq(col0 - last_source_col0));
                    last_source_col0 = col0;
                }
            }
        }

        Some(SourceMap {
            version: VERSION,
            file: self.file.clone(),
            source_root: None,
            sources,
            sources_content,
            names: Vec::new(),
            mappings,
        })
    }
}

/// Serialize `stylesheet` while recording, for every node, where its prelude
/// landed in the output. Returns the output text together with the map from
/// output positions back to `resource_path`.
pub fn serialize_with_map<E: CssEngine>(
    engine: &E,
    stylesheet: &Stylesheet,
    resource_path: &Path,
    source: &str,
) -> (String, SourceMap) {
    let file = resource_path.to_string_lossy().into_owned();
    let mut builder = MapBuilder::new(file, source);
    let output = engine.serialize_tracked(stylesheet, &mut builder);
    let map = builder.finish();
    (output, map)
}

struct MapBuilder {
    generator: SourceMapGenerator,
    file: String,
    source: String,
    lines_added: usize,
}

impl MapBuilder {
    fn new(file: String, source: &str) -> Self {
        let mut generator = SourceMapGenerator::new(Some(file.clone()));
        generator.add_source(file.clone(), Some(source.to_string()));
        generator.add_line();
        MapBuilder {
            generator,
            file,
            source: source.to_string(),
            lines_added: 1,
        }
    }

    fn finish(self) -> SourceMap {
        match self.generator.to_json() {
            Some(map) => map,
            // Empty stylesheet: a map with sources but no segments
            None => SourceMap {
                version: VERSION,
                file: Some(self.file.clone()),
                source_root: None,
                sources: vec![self.file],
                sources_content: vec![Some(self.source)],
                names: Vec::new(),
                mappings: String::new(),
            },
        }
    }
}

impl PositionObserver for MapBuilder {
    fn record(&mut self, output: Position, source: Position) {
        while self.lines_added <= output.line {
            self.generator.add_line();
            self.lines_added += 1;
        }
        self.generator
            .add_mapping(
                output.column,
                Some(self.file.clone()),
                Some(source.line),
                Some(source.column),
            )
            .expect("serializer reports positions in output order");
    }
}

/// A decoded mapping segment: a generated column, optionally tied to a
/// position in one of the map's sources. Name indices are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedSegment {
    pub generated_column: usize,
    pub source: Option<SourceRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRef {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

/// Decode a `mappings` string into per-line segments.
pub fn decode_mappings(mappings: &str) -> Vec<Vec<DecodedSegment>> {
    let mut lines = Vec::new();
    let mut source_index = 0i64;
    let mut source_line = 0i64;
    let mut source_column = 0i64;

    for group in mappings.split(';') {
        let mut segments = Vec::new();
        let mut generated_column = 0i64;
        for encoded in group.split(',') {
            if encoded.is_empty() {
                continue;
            }
            let mut digits = encoded.chars();
            let Some(column_delta) = decode_vlq(&mut digits) else {
                continue;
            };
            generated_column += column_delta;

            let source = match decode_vlq(&mut digits) {
                Some(index_delta) => {
                    source_index += index_delta;
                    source_line += decode_vlq(&mut digits).unwrap_or(0);
                    source_column += decode_vlq(&mut digits).unwrap_or(0);
                    Some(SourceRef {
                        index: source_index.max(0) as usize,
                        line: source_line.max(0) as usize,
                        column: source_column.max(0) as usize,
                    })
                }
                None => None,
            };
            segments.push(DecodedSegment {
                generated_column: generated_column.max(0) as usize,
                source,
            });
        }
        lines.push(segments);
    }
    lines
}

/// Compose the transform's own map (`delta`, output → upstream text) over the
/// map that arrived from the previous stage (`original`, upstream text → true
/// sources), producing output → true sources. Without a usable upstream map
/// the delta already is the answer.
pub fn extend_source_map(original: &SourceMap, delta: &SourceMap) -> SourceMap {
    if original.mappings.is_empty() || original.sources.is_empty() {
        return delta.clone();
    }

    let original_lines = decode_mappings(&original.mappings);
    let delta_lines = decode_mappings(&delta.mappings);

    let mut mappings = String::new();
    let mut last_source_index = 0i64;
    let mut last_source_line = 0i64;
    let mut last_source_column = 0i64;

    for (line_index, segments) in delta_lines.iter().enumerate() {
        if line_index > 0 {
            mappings.push(';');
        }
        let mut last_generated_column = 0i64;
        let mut first = true;
        for segment in segments {
            let Some(intermediate) = segment.source else {
                continue;
            };
            let Some(mapped) = lookup(&original_lines, intermediate.line, intermediate.column)
            else {
                continue;
            };
            if !first {
                mappings.push(',');
            }
            first = false;

            mappings.push_str(&to_base64_vlq(
                segment.generated_column as i64 - last_generated_column,
            ));
            last_generated_column = segment.generated_column as i64;

            mappings.push_str(&to_base64_vlq(mapped.index as i64 - last_source_index));
            last_source_index = mapped.index as i64;

            mappings.push_str(&to_base64_vlq(mapped.line as i64 - last_source_line));
            last_source_line = mapped.line as i64;

            mappings.push_str(&to_base64_vlq(mapped.column as i64 - last_source_column));
            last_source_column = mapped.column as i64;
        }
    }

    SourceMap {
        version: VERSION,
        file: delta.file.clone(),
        source_root: original.source_root.clone(),
        sources: original.sources.clone(),
        sources_content: original.sources_content.clone(),
        names: Vec::new(),
        mappings,
    }
}

/// Last mapped segment at or before `column` on `line`, with the column
/// offset inside the segment carried over.
fn lookup(lines: &[Vec<DecodedSegment>], line: usize, column: usize) -> Option<SourceRef> {
    let segments = lines.get(line)?;
    let mut best: Option<(usize, SourceRef)> = None;
    for segment in segments {
        if segment.generated_column > column {
            break;
        }
        if let Some(source) = segment.source {
            best = Some((segment.generated_column, source));
        }
    }
    best.map(|(generated_column, mut source)| {
        source.column += column - generated_column;
        source
    })
}

/// Resolve `file` and every `sources` entry against `base`, leaving paths
/// that are already absolute alone.
pub fn absolutize(map: &mut SourceMap, base: &Path) {
    if let Some(file) = map.file.take() {
        map.file = Some(resolve(base, &file));
    }
    for source in &mut map.sources {
        *source = resolve(base, source);
    }
}

fn resolve(base: &Path, path: &str) -> String {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        path.to_string()
    } else {
        base.join(candidate).to_string_lossy().into_owned()
    }
}

const B64_DIGITS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn to_base64_vlq(value: i64) -> String {
    let mut value = if value < 0 { (-value << 1) + 1 } else { value << 1 };

    let mut out = String::new();
    loop {
        let mut digit = value & 31;
        value >>= 5;
        if value > 0 {
            digit |= 32;
        }
        out.push(B64_DIGITS[digit as usize] as char);
        if value <= 0 {
            break;
        }
    }
    out
}

fn decode_vlq(digits: &mut impl Iterator<Item = char>) -> Option<i64> {
    let mut result = 0i64;
    let mut shift = 0u32;
    loop {
        let ch = digits.next()?;
        let digit = B64_DIGITS.iter().position(|&d| d as char == ch)? as i64;
        result |= (digit & 31) << shift;
        if digit & 32 == 0 {
            break;
        }
        shift += 5;
    }
    let negative = result & 1 == 1;
    let value = result >> 1;
    Some(if negative { -value } else { value })
}
