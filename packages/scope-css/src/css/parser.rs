//! CSS Parser
//!
//! Single-pass cursor over the source text producing a [`Stylesheet`]. The
//! grammar is the block structure of CSS only: statements end at `;` or open
//! a `{ … }` block, strings and comments are consumed atomically, and
//! everything between structural tokens is kept verbatim. Selector syntax is
//! not validated; malformed selector text flows through unchanged.

use super::ast::{AtRule, Block, Declaration, Node, Position, Rule, Stylesheet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssParseError {
    #[error("unclosed block (opened at {0})")]
    UnclosedBlock(Position),
    #[error("unclosed string (started at {0})")]
    UnclosedString(Position),
    #[error("unclosed comment (started at {0})")]
    UnclosedComment(Position),
    #[error("unexpected `}}` at {0}")]
    UnexpectedClose(Position),
}

/// Parse a stylesheet. Trivia is preserved so that serializing the returned
/// tree without modifications reproduces `source` byte-for-byte.
pub fn parse(source: &str) -> Result<Stylesheet, CssParseError> {
    let mut parser = Parser::new(source);
    let (nodes, after) = parser.parse_nodes(None)?;
    Ok(Stylesheet { nodes, after })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Parser {
            chars: source.chars().collect(),
            pos: 0,
            line: 0,
            column: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Parse statements until EOF (top level, `opened_at` is `None`) or the
    /// closing `}` of the block opened at `opened_at`. Returns the nodes and
    /// the trivia trailing the last statement.
    fn parse_nodes(
        &mut self,
        opened_at: Option<Position>,
    ) -> Result<(Vec<Node>, String), CssParseError> {
        let mut nodes = Vec::new();
        loop {
            let before = self.take_trivia()?;
            match self.peek() {
                None => {
                    return match opened_at {
                        None => Ok((nodes, before)),
                        Some(open) => Err(CssParseError::UnclosedBlock(open)),
                    };
                }
                Some('}') => {
                    if opened_at.is_some() {
                        self.bump();
                        return Ok((nodes, before));
                    }
                    return Err(CssParseError::UnexpectedClose(self.position()));
                }
                Some(_) => {
                    let node = self.parse_statement(before)?;
                    nodes.push(node);
                }
            }
        }
    }

    /// One statement: a prelude terminated by `;` (declaration or block-less
    /// at-rule), a `{ … }` block (rule or at-rule), the enclosing `}`, or EOF.
    fn parse_statement(&mut self, before: String) -> Result<Node, CssParseError> {
        let start = self.position();
        let mut prelude = String::new();
        let mut parens = 0i32;
        let mut brackets = 0i32;

        loop {
            match self.peek() {
                None => return Ok(flat_statement(before, prelude, start, false)),
                Some('}') if parens <= 0 && brackets <= 0 => {
                    // Not consumed; the caller closes the block.
                    return Ok(flat_statement(before, prelude, start, false));
                }
                Some(';') if parens <= 0 && brackets <= 0 => {
                    self.bump();
                    return Ok(flat_statement(before, prelude, start, true));
                }
                Some('{') if parens <= 0 && brackets <= 0 => {
                    let open = self.position();
                    self.bump();
                    let (nodes, after) = self.parse_nodes(Some(open))?;
                    return Ok(block_statement(before, prelude, start, nodes, after));
                }
                Some(quote @ ('\'' | '"')) => {
                    let string_start = self.position();
                    self.bump();
                    prelude.push(quote);
                    self.consume_string(quote, string_start, &mut prelude)?;
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.consume_comment(&mut prelude)?;
                }
                Some('\\') => {
                    self.bump();
                    prelude.push('\\');
                    if let Some(escaped) = self.bump() {
                        prelude.push(escaped);
                    }
                }
                Some(ch) => {
                    match ch {
                        '(' => parens += 1,
                        ')' => parens -= 1,
                        '[' => brackets += 1,
                        ']' => brackets -= 1,
                        _ => {}
                    }
                    self.bump();
                    prelude.push(ch);
                }
            }
        }
    }

    /// Whitespace and comments, kept verbatim.
    fn take_trivia(&mut self) -> Result<String, CssParseError> {
        let mut trivia = String::new();
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                    trivia.push(ch);
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.consume_comment(&mut trivia)?;
                }
                _ => return Ok(trivia),
            }
        }
    }

    /// Consume a `/* … */` comment into `buffer`, cursor at the opening `/`.
    fn consume_comment(&mut self, buffer: &mut String) -> Result<(), CssParseError> {
        let start = self.position();
        self.bump();
        self.bump();
        buffer.push_str("/*");
        loop {
            match self.peek() {
                None => return Err(CssParseError::UnclosedComment(start)),
                Some('*') if self.peek_next() == Some('/') => {
                    self.bump();
                    self.bump();
                    buffer.push_str("*/");
                    return Ok(());
                }
                Some(ch) => {
                    self.bump();
                    buffer.push(ch);
                }
            }
        }
    }

    /// Consume string content into `buffer` up to and including the closing
    /// quote. The opening quote has already been consumed.
    fn consume_string(
        &mut self,
        quote: char,
        start: Position,
        buffer: &mut String,
    ) -> Result<(), CssParseError> {
        loop {
            match self.peek() {
                None => return Err(CssParseError::UnclosedString(start)),
                Some('\\') => {
                    self.bump();
                    buffer.push('\\');
                    match self.bump() {
                        Some(escaped) => buffer.push(escaped),
                        None => return Err(CssParseError::UnclosedString(start)),
                    }
                }
                Some(ch) => {
                    self.bump();
                    buffer.push(ch);
                    if ch == quote {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// A statement without a block: an at-rule like `@import x;` or a
/// declaration. The raw text keeps its own trailing whitespace.
fn flat_statement(before: String, prelude: String, start: Position, semicolon: bool) -> Node {
    if prelude.trim_start().starts_with('@') {
        let (core, between) = split_trailing_trivia(&prelude);
        let (name, after_name, params) = split_at_rule_prelude(core);
        Node::AtRule(AtRule {
            before,
            name,
            after_name,
            params,
            between,
            block: None,
            semicolon,
            start,
        })
    } else {
        Node::Declaration(Declaration {
            before,
            text: prelude,
            semicolon,
            start,
        })
    }
}

fn block_statement(
    before: String,
    prelude: String,
    start: Position,
    nodes: Vec<Node>,
    after: String,
) -> Node {
    let (core, between) = split_trailing_trivia(&prelude);
    if core.starts_with('@') {
        let (name, after_name, params) = split_at_rule_prelude(core);
        Node::AtRule(AtRule {
            before,
            name,
            after_name,
            params,
            between,
            block: Some(Block { nodes, after }),
            semicolon: false,
            start,
        })
    } else {
        Node::Rule(Rule {
            before,
            selector: core.to_string(),
            between,
            nodes,
            after,
            start,
        })
    }
}

/// Split trailing whitespace off a prelude; it becomes the node's `between`.
fn split_trailing_trivia(prelude: &str) -> (&str, String) {
    let trimmed = prelude.trim_end();
    (trimmed, prelude[trimmed.len()..].to_string())
}

/// `@media screen and (…)` → (`media`, ` `, `screen and (…)`).
fn split_at_rule_prelude(core: &str) -> (String, String, String) {
    let body = core.strip_prefix('@').unwrap_or(core);
    let name_end = body
        .find(|ch: char| ch.is_whitespace() || ch == '(')
        .unwrap_or(body.len());
    let name = &body[..name_end];
    let rest = &body[name_end..];
    let params_start = rest
        .find(|ch: char| !ch.is_whitespace())
        .unwrap_or(rest.len());
    (
        name.to_string(),
        rest[..params_start].to_string(),
        rest[params_start..].to_string(),
    )
}
