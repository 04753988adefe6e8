//! Selector Scoping Transform Tests

mod utils;

use pretty_assertions::assert_eq;
use scope_css::css::{Node, Rule, Stylesheet};
use scope_css::{apply, rewrite_selector, ScopeConfig};
use utils::scope;

#[test]
fn should_prepend_the_scope_to_plain_selectors() {
    assert_eq!(
        scope("a.link { color: blue; }", ".editor-block-list__block "),
        ".editor-block-list__block a.link { color: blue; }"
    );
}

#[test]
fn should_prepend_the_scope_to_every_selector_in_a_list() {
    assert_eq!(
        scope("a, .b > .c { color: blue; }", ".scope "),
        ".scope a, .scope .b > .c { color: blue; }"
    );
}

#[test]
fn should_preserve_selector_order() {
    assert_eq!(
        scope("em, strong, a[title=\"x,y\"] {}", ".scope "),
        ".scope em, .scope strong, .scope a[title=\"x,y\"] {}"
    );
}

#[test]
fn should_leave_keyframe_steps_alone() {
    let css = "@keyframes fade { from { opacity: 0; } to { opacity: 1; } }";
    assert_eq!(scope(css, ".scope "), css);
}

#[test]
fn should_leave_percentage_steps_alone() {
    let css = "@keyframes grow { 0% { width: 0; } 50.5% { width: 5px; } 100% { width: 10px; } }";
    assert_eq!(scope(css, ".scope "), css);
}

#[test]
fn should_scope_rules_around_keyframes() {
    let css = "a { animation: fade 1s; }\n@keyframes fade { from { opacity: 0; } to { opacity: 1; } }";
    let expected = ".scope a { animation: fade 1s; }\n@keyframes fade { from { opacity: 0; } to { opacity: 1; } }";
    assert_eq!(scope(css, ".scope "), expected);
}

#[test]
fn should_scope_rules_inside_media_queries() {
    assert_eq!(
        scope(
            "@media screen and (min-width: 100px) { a { color: blue; } }",
            ".scope "
        ),
        "@media screen and (min-width: 100px) { .scope a { color: blue; } }"
    );
}

#[test]
fn should_skip_selectors_already_carrying_the_scope() {
    let css = ".custom-scope a.link { color: blue; }";
    assert_eq!(scope(css, ".custom-scope "), css);
}

#[test]
fn should_be_idempotent() {
    let css = "a.link { color: blue; }\n.b, .c { margin: 0; }";
    let once = scope(css, ".scope ");
    let twice = scope(&once, ".scope ");
    assert_eq!(twice, once);
}

#[test]
fn should_leave_the_tree_untouched_with_an_empty_scope() {
    let css = "a.link { color: blue; }  /* tail */\n";
    assert_eq!(scope(css, ""), css);
    assert_eq!(scope(css, "   \t"), css);
}

#[test]
fn should_concatenate_scope_and_selector_verbatim() {
    let config = ScopeConfig::new(".scope ");
    for selector in ["a.link", ".foo > .bar", "#id:hover", "*"] {
        assert_eq!(
            rewrite_selector(selector, &config),
            format!(".scope {}", selector)
        );
    }
}

#[test]
fn should_not_insert_a_separator_itself() {
    // The configured value carries the separator; without one the scope and
    // selector touch.
    let config = ScopeConfig::new(".scope");
    assert_eq!(rewrite_selector("a", &config), ".scopea");
}

#[test]
fn should_rewrite_hand_built_trees() {
    let mut stylesheet = Stylesheet::new(vec![Node::Rule(Rule::new(["a.link", "p"]))]);
    apply(&mut stylesheet, &ScopeConfig::new(".wrap "));
    let Node::Rule(rule) = &stylesheet.nodes[0] else {
        panic!("expected a rule");
    };
    assert_eq!(
        rule.selectors().to_vec(),
        vec![".wrap a.link".to_string(), ".wrap p".to_string()]
    );
}

#[test]
fn should_not_scope_top_level_from_and_to_selectors() {
    // `from` and `to` are exempt wherever they appear, matching the
    // selector-level rule rather than block context.
    let css = "from { margin: 0; }";
    assert_eq!(scope(css, ".scope "), css);
}
