//! CSS Engine
//!
//! The parse/serialize capability behind the scoping transform, exposed as a
//! trait so the transform stays testable against hand-built trees and so a
//! different engine can be injected by the surrounding pipeline.

pub mod ast;
pub mod parser;
pub mod serializer;

pub use ast::{AtRule, Block, Declaration, Node, Position, Rule, SelectorList, Stylesheet};
pub use parser::CssParseError;
pub use serializer::PositionObserver;

pub trait CssEngine {
    fn parse(&self, source: &str) -> Result<Stylesheet, CssParseError>;

    fn serialize(&self, stylesheet: &Stylesheet) -> String;

    /// Serialize while reporting node positions to `observer`. Engines
    /// without position tracking fall back to plain serialization and report
    /// nothing, which simply yields an empty source map downstream.
    fn serialize_tracked(
        &self,
        stylesheet: &Stylesheet,
        observer: &mut dyn PositionObserver,
    ) -> String {
        let _ = observer;
        self.serialize(stylesheet)
    }
}

/// The engine implemented by this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEngine;

impl CssEngine for DefaultEngine {
    fn parse(&self, source: &str) -> Result<Stylesheet, CssParseError> {
        parser::parse(source)
    }

    fn serialize(&self, stylesheet: &Stylesheet) -> String {
        serializer::serialize(stylesheet)
    }

    fn serialize_tracked(
        &self,
        stylesheet: &Stylesheet,
        observer: &mut dyn PositionObserver,
    ) -> String {
        serializer::serialize_tracked(stylesheet, observer)
    }
}
