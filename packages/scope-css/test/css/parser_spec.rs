//! CSS Parser Tests

use scope_css::css::parser::parse;
use scope_css::css::{CssParseError, Node, Position};

#[test]
fn should_parse_empty_input() {
    let stylesheet = parse("").unwrap();
    assert!(stylesheet.nodes.is_empty());
    assert_eq!(stylesheet.after, "");
}

#[test]
fn should_parse_a_rule_with_declarations() {
    let stylesheet = parse("a { color: blue; }").unwrap();
    assert_eq!(stylesheet.nodes.len(), 1);
    let Node::Rule(rule) = &stylesheet.nodes[0] else {
        panic!("expected a rule");
    };
    assert_eq!(rule.selector, "a");
    assert_eq!(rule.nodes.len(), 1);
    let Node::Declaration(declaration) = &rule.nodes[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(declaration.prop(), "color");
    assert_eq!(declaration.value(), "blue");
    assert!(declaration.semicolon);
}

#[test]
fn should_split_selector_lists_on_top_level_commas() {
    let stylesheet = parse("a, b > c, :is(d, e) {}").unwrap();
    let Node::Rule(rule) = &stylesheet.nodes[0] else {
        panic!("expected a rule");
    };
    let selectors = rule.selectors();
    let selectors: Vec<&str> = selectors.iter().map(String::as_str).collect();
    assert_eq!(selectors, vec!["a", "b > c", ":is(d, e)"]);
}

#[test]
fn should_parse_block_less_at_rules() {
    let stylesheet = parse("@import url(base.css);").unwrap();
    let Node::AtRule(at_rule) = &stylesheet.nodes[0] else {
        panic!("expected an at-rule");
    };
    assert_eq!(at_rule.name, "import");
    assert_eq!(at_rule.params, "url(base.css)");
    assert!(at_rule.block.is_none());
    assert!(at_rule.semicolon);
}

#[test]
fn should_parse_rules_nested_in_at_rules() {
    let stylesheet = parse("@media screen { a { color: blue; } }").unwrap();
    let Node::AtRule(at_rule) = &stylesheet.nodes[0] else {
        panic!("expected an at-rule");
    };
    assert_eq!(at_rule.name, "media");
    assert_eq!(at_rule.params, "screen");
    let block = at_rule.block.as_ref().expect("media should have a block");
    assert_eq!(block.nodes.len(), 1);
    assert!(matches!(block.nodes[0], Node::Rule(_)));
}

#[test]
fn should_parse_keyframe_steps_as_rules() {
    let stylesheet = parse("@keyframes fade { from { opacity: 0; } 50% { opacity: 1; } }").unwrap();
    let Node::AtRule(at_rule) = &stylesheet.nodes[0] else {
        panic!("expected an at-rule");
    };
    let block = at_rule.block.as_ref().unwrap();
    let selectors: Vec<String> = block
        .nodes
        .iter()
        .map(|node| match node {
            Node::Rule(rule) => rule.selector.clone(),
            other => panic!("expected a rule, got {:?}", other),
        })
        .collect();
    assert_eq!(selectors, vec!["from".to_string(), "50%".to_string()]);
}

#[test]
fn should_capture_nested_rule_shapes() {
    let stylesheet = parse("a {b {c}} d {e}").unwrap();
    assert_eq!(stylesheet.nodes.len(), 2);
    let Node::Rule(a) = &stylesheet.nodes[0] else {
        panic!("expected a rule");
    };
    assert_eq!(a.selector, "a");
    let Node::Rule(b) = &a.nodes[0] else {
        panic!("expected a nested rule");
    };
    assert_eq!(b.selector, "b");
    let Node::Declaration(c) = &b.nodes[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(c.text, "c");
    assert!(!c.semicolon);
}

#[test]
fn should_keep_comments_in_trivia() {
    let stylesheet = parse("/* leading */ a { }").unwrap();
    let Node::Rule(rule) = &stylesheet.nodes[0] else {
        panic!("expected a rule");
    };
    assert_eq!(rule.before, "/* leading */ ");
    assert_eq!(rule.selector, "a");
}

#[test]
fn should_not_treat_braces_inside_strings_as_structure() {
    let stylesheet = parse("a { content: \"}{\"; }").unwrap();
    let Node::Rule(rule) = &stylesheet.nodes[0] else {
        panic!("expected a rule");
    };
    assert_eq!(rule.nodes.len(), 1);
    let Node::Declaration(declaration) = &rule.nodes[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(declaration.value(), "\"}{\"");
}

#[test]
fn should_record_node_positions() {
    let stylesheet = parse("a { color: blue; }\n.b { }").unwrap();
    let Node::Rule(a) = &stylesheet.nodes[0] else {
        panic!("expected a rule");
    };
    assert_eq!(a.start, Position::new(0, 0));
    let Node::Declaration(declaration) = &a.nodes[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(declaration.start, Position::new(0, 4));
    let Node::Rule(b) = &stylesheet.nodes[1] else {
        panic!("expected a rule");
    };
    assert_eq!(b.start, Position::new(1, 0));
}

#[test]
fn should_report_unclosed_blocks() {
    assert_eq!(
        parse("a {"),
        Err(CssParseError::UnclosedBlock(Position::new(0, 2)))
    );
}

#[test]
fn should_report_unclosed_strings() {
    assert!(matches!(
        parse("a { content: \"oops; }"),
        Err(CssParseError::UnclosedString(_))
    ));
}

#[test]
fn should_report_unclosed_comments() {
    assert!(matches!(
        parse("a { } /* trailing"),
        Err(CssParseError::UnclosedComment(_))
    ));
}

#[test]
fn should_report_stray_closing_braces() {
    assert_eq!(
        parse("a { } }"),
        Err(CssParseError::UnexpectedClose(Position::new(0, 6)))
    );
}

#[test]
fn should_accept_statements_without_bodies() {
    let stylesheet = parse("a;").unwrap();
    let Node::Declaration(declaration) = &stylesheet.nodes[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(declaration.text, "a");
    assert!(declaration.semicolon);
}
