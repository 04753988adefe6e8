//! Serializer Tests

use pretty_assertions::assert_eq;
use scope_css::css::parser::parse;
use scope_css::css::serializer::{serialize, serialize_tracked, PositionObserver};
use scope_css::css::{Node, Position};

fn round_trip(css: &str) {
    let stylesheet = parse(css).expect("round-trip input should parse");
    assert_eq!(serialize(&stylesheet), css);
}

#[test]
fn should_round_trip_untouched_trees() {
    round_trip("a { color: blue; }");
    round_trip("a{color:blue}");
    round_trip("a { color: blue }\n");
    round_trip("/* header */\na,\nb > c {\n  margin: 0;\n  /* inline */\n  padding: 0;\n}\n");
    round_trip("@import url(base.css);\n@media screen and (min-width: 100px) { a { } }\n");
    round_trip("@keyframes fade { from { opacity: 0; } to { opacity: 1; } }");
    round_trip("a { background: url(\"img{1}.png\"); content: ';'; }");
    round_trip("a[title=\"x,y\"]::before { content: \"\\\"\"; }");
}

#[test]
fn should_join_rewritten_selectors_with_the_source_separator() {
    let mut stylesheet = parse("a,b { }").unwrap();
    let Node::Rule(rule) = &mut stylesheet.nodes[0] else {
        panic!("expected a rule");
    };
    rule.set_selectors(&["x".to_string(), "y".to_string()]);
    assert_eq!(serialize(&stylesheet), "x,y { }");
}

#[derive(Default)]
struct Recorder {
    records: Vec<(Position, Position)>,
}

impl PositionObserver for Recorder {
    fn record(&mut self, output: Position, source: Position) {
        self.records.push((output, source));
    }
}

#[test]
fn should_report_output_and_source_positions() {
    let stylesheet = parse("a { color: blue; }\n.b { }").unwrap();
    let mut recorder = Recorder::default();
    let output = serialize_tracked(&stylesheet, &mut recorder);
    assert_eq!(output, "a { color: blue; }\n.b { }");
    // Untouched trees map every node onto itself.
    assert_eq!(
        recorder.records,
        vec![
            (Position::new(0, 0), Position::new(0, 0)),
            (Position::new(0, 4), Position::new(0, 4)),
            (Position::new(1, 0), Position::new(1, 0)),
        ]
    );
}

#[test]
fn should_report_shifted_output_positions_after_a_rewrite() {
    let mut stylesheet = parse("a { color: blue; }").unwrap();
    {
        let Node::Rule(rule) = &mut stylesheet.nodes[0] else {
            panic!("expected a rule");
        };
        rule.set_selectors(&[".x a".to_string()]);
    }
    let mut recorder = Recorder::default();
    let output = serialize_tracked(&stylesheet, &mut recorder);
    assert_eq!(output, ".x a { color: blue; }");
    // The declaration moved right by the three prepended characters but
    // still points at its source position.
    assert_eq!(
        recorder.records[1],
        (Position::new(0, 7), Position::new(0, 4))
    );
}
