//! Rule Tree
//!
//! The parsed form of a stylesheet: an ordered forest of rules, at-rules and
//! declarations. Trivia (whitespace and comments) around every node is kept
//! verbatim so an untouched tree serializes back to the exact input text.

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;

/// Selector lists are almost always one or two entries long.
pub type SelectorList = SmallVec<[String; 2]>;

/// Separator used when a rewritten selector list is joined back together:
/// the first comma-plus-whitespace run of the original list.
static SELECTOR_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*").unwrap());

/// Zero-based line/column of a node's prelude start in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // One-based for human consumption
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}

/// An ordered forest of nodes plus the trivia trailing the last node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
    pub after: String,
}

impl Stylesheet {
    pub fn new(nodes: Vec<Node>) -> Self {
        Stylesheet {
            nodes,
            after: String::new(),
        }
    }

    /// Visit every rule in document order, depth-first, including rules
    /// nested inside at-rule blocks (keyframe steps) and other rules.
    pub fn walk_rules_mut<F: FnMut(&mut Rule)>(&mut self, f: &mut F) {
        walk_nodes_mut(&mut self.nodes, f);
    }
}

fn walk_nodes_mut<F: FnMut(&mut Rule)>(nodes: &mut [Node], f: &mut F) {
    for node in nodes {
        match node {
            Node::Rule(rule) => {
                f(rule);
                walk_nodes_mut(&mut rule.nodes, f);
            }
            Node::AtRule(at_rule) => {
                if let Some(block) = &mut at_rule.block {
                    walk_nodes_mut(&mut block.nodes, f);
                }
            }
            Node::Declaration(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Declaration(Declaration),
}

/// A style rule: selector list plus a `{ … }` body.
///
/// The selector list is stored as written (`selector`); [`Rule::selectors`]
/// splits it on top-level commas and [`Rule::set_selectors`] joins a new list
/// back using the original separator, so rules the caller never rewrites keep
/// their source text byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Trivia preceding the rule.
    pub before: String,
    /// The raw selector list, trailing trivia trimmed into `between`.
    pub selector: String,
    /// Trivia between the selector list and the opening `{`.
    pub between: String,
    pub nodes: Vec<Node>,
    /// Trivia before the closing `}`.
    pub after: String,
    pub start: Position,
}

impl Rule {
    /// Build a rule from individual selectors, for hand-built trees.
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selector = selectors
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>()
            .join(", ");
        Rule {
            before: String::new(),
            selector,
            between: " ".to_string(),
            nodes: Vec::new(),
            after: String::new(),
            start: Position::default(),
        }
    }

    /// The selector list split on top-level commas, each entry trimmed.
    /// Commas inside parentheses, brackets or strings do not split.
    pub fn selectors(&self) -> SelectorList {
        split_top_level_commas(&self.selector)
            .into_iter()
            .map(|part| part.trim().to_string())
            .collect()
    }

    /// Replace the selector list. Entries are joined with the first
    /// comma separator found in the current list (`", "` when there is none),
    /// mirroring how the source list was written.
    pub fn set_selectors(&mut self, selectors: &[String]) {
        let separator = SELECTOR_SEPARATOR_RE
            .find(&self.selector)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| ", ".to_string());
        self.selector = selectors.join(&separator);
    }
}

/// An at-rule: `@name params { … }` or `@name params;`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// Trivia preceding the at-rule.
    pub before: String,
    /// Name without the leading `@`.
    pub name: String,
    /// Trivia between the name and the params.
    pub after_name: String,
    pub params: String,
    /// Trivia between the params and the `{` or `;`.
    pub between: String,
    /// `None` for block-less at-rules such as `@import`.
    pub block: Option<Block>,
    /// Whether a block-less at-rule was terminated by `;`.
    pub semicolon: bool,
    pub start: Position,
}

impl AtRule {
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        AtRule {
            before: String::new(),
            name: name.into(),
            after_name: " ".to_string(),
            params: params.into(),
            between: String::new(),
            block: None,
            semicolon: true,
            start: Position::default(),
        }
    }

    pub fn with_block(mut self, nodes: Vec<Node>) -> Self {
        self.between = " ".to_string();
        self.block = Some(Block {
            nodes,
            after: String::new(),
        });
        self.semicolon = false;
        self
    }
}

/// The `{ … }` body of an at-rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub nodes: Vec<Node>,
    /// Trivia before the closing `}`.
    pub after: String,
}

/// A `property: value` statement. The text is kept as written; the transform
/// never reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Trivia preceding the declaration.
    pub before: String,
    /// Raw statement text, e.g. `color: blue`.
    pub text: String,
    /// Whether the statement was terminated by `;`.
    pub semicolon: bool,
    pub start: Position,
}

impl Declaration {
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Declaration {
            before: String::new(),
            text: format!("{}: {}", prop.into(), value.into()),
            semicolon: true,
            start: Position::default(),
        }
    }

    /// Property name, up to the first colon.
    pub fn prop(&self) -> &str {
        match self.text.find(':') {
            Some(index) => self.text[..index].trim_end(),
            None => self.text.trim_end(),
        }
    }

    /// Value text, after the first colon.
    pub fn value(&self) -> &str {
        match self.text.find(':') {
            Some(index) => self.text[index + 1..].trim(),
            None => "",
        }
    }
}

/// Split `text` on commas that are not nested inside parentheses, brackets,
/// strings or escapes.
pub fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut parens = 0i32;
    let mut brackets = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '\'' | '"' => match quote {
                Some(open) if open == ch => quote = None,
                Some(_) => {}
                None => quote = Some(ch),
            },
            _ if quote.is_some() => {}
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            ',' if parens == 0 && brackets == 0 => {
                parts.push(&text[start..index]);
                start = index + ch.len_utf8();
            }
            _ => {}
        }
    }

    parts.push(&text[start..]);
    parts
}
