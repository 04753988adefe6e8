//! Serializer
//!
//! Prints a rule tree back to CSS text. All trivia captured by the parser is
//! emitted verbatim, so a tree that was never rewritten reproduces its source
//! exactly. [`serialize_tracked`] additionally reports, for every node, where
//! its prelude landed in the output together with where it came from in the
//! source, which is what source-map emission consumes.

use super::ast::{AtRule, Declaration, Node, Position, Rule, Stylesheet};

/// Receives one `(output position, source position)` pair per printed node.
pub trait PositionObserver {
    fn record(&mut self, output: Position, source: Position);
}

pub fn serialize(stylesheet: &Stylesheet) -> String {
    let mut printer = Printer {
        out: String::new(),
        line: 0,
        column: 0,
        observer: None,
    };
    printer.print_stylesheet(stylesheet);
    printer.out
}

pub fn serialize_tracked(
    stylesheet: &Stylesheet,
    observer: &mut dyn PositionObserver,
) -> String {
    let mut printer = Printer {
        out: String::new(),
        line: 0,
        column: 0,
        observer: Some(observer),
    };
    printer.print_stylesheet(stylesheet);
    printer.out
}

struct Printer<'a> {
    out: String,
    line: usize,
    column: usize,
    observer: Option<&'a mut dyn PositionObserver>,
}

impl Printer<'_> {
    fn push(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.out.push_str(text);
    }

    fn mark(&mut self, source: Position) {
        let output = Position::new(self.line, self.column);
        if let Some(observer) = self.observer.as_mut() {
            observer.record(output, source);
        }
    }

    fn print_stylesheet(&mut self, stylesheet: &Stylesheet) {
        self.print_nodes(&stylesheet.nodes);
        self.push(&stylesheet.after);
    }

    fn print_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Rule(rule) => self.print_rule(rule),
                Node::AtRule(at_rule) => self.print_at_rule(at_rule),
                Node::Declaration(declaration) => self.print_declaration(declaration),
            }
        }
    }

    fn print_rule(&mut self, rule: &Rule) {
        self.push(&rule.before);
        self.mark(rule.start);
        self.push(&rule.selector);
        self.push(&rule.between);
        self.push("{");
        self.print_nodes(&rule.nodes);
        self.push(&rule.after);
        self.push("}");
    }

    fn print_at_rule(&mut self, at_rule: &AtRule) {
        self.push(&at_rule.before);
        self.mark(at_rule.start);
        self.push("@");
        self.push(&at_rule.name);
        self.push(&at_rule.after_name);
        self.push(&at_rule.params);
        self.push(&at_rule.between);
        match &at_rule.block {
            Some(block) => {
                self.push("{");
                self.print_nodes(&block.nodes);
                self.push(&block.after);
                self.push("}");
            }
            None => {
                if at_rule.semicolon {
                    self.push(";");
                }
            }
        }
    }

    fn print_declaration(&mut self, declaration: &Declaration) {
        self.push(&declaration.before);
        self.mark(declaration.start);
        self.push(&declaration.text);
        if declaration.semicolon {
            self.push(";");
        }
    }
}
