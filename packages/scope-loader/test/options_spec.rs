//! Loader Options Tests

use scope_loader::{FilePattern, OptionsError, ScopeLoaderOptions, DEFAULT_SELECTOR};

#[test]
fn should_default_to_the_editor_block_scope() {
    let options = ScopeLoaderOptions::default();
    assert!(options.files.is_empty());
    assert_eq!(options.selector, DEFAULT_SELECTOR);
    assert_eq!(options.selector, ".editor-block-list__block");
    assert!(!options.source_map);
}

#[test]
fn should_fall_back_to_defaults_for_an_empty_object() {
    let options = ScopeLoaderOptions::from_json("{}").unwrap();
    assert!(options.files.is_empty());
    assert_eq!(options.selector, DEFAULT_SELECTOR);
    assert!(!options.source_map);
}

#[test]
fn should_deserialize_full_json_options() {
    let options = ScopeLoaderOptions::from_json(
        r#"{
            "files": ["simple.css", { "regex": "\\.scss$" }],
            "selector": ".wrap",
            "sourceMap": true
        }"#,
    )
    .unwrap();
    assert_eq!(options.selector, ".wrap");
    assert!(options.source_map);
    assert_eq!(options.files.len(), 2);
    assert!(matches!(&options.files[0], FilePattern::Literal(value) if value == "simple.css"));
    assert!(matches!(&options.files[1], FilePattern::Pattern(_)));
}

#[test]
fn should_reject_unknown_fields() {
    let result = ScopeLoaderOptions::from_json(r#"{ "selectors": ".wrap" }"#);
    assert!(matches!(result, Err(OptionsError::Schema(_))));
}

#[test]
fn should_reject_ill_typed_fields() {
    let result = ScopeLoaderOptions::from_json(r#"{ "files": "simple.css" }"#);
    assert!(matches!(result, Err(OptionsError::Schema(_))));
    let result = ScopeLoaderOptions::from_json(r#"{ "sourceMap": "yes" }"#);
    assert!(matches!(result, Err(OptionsError::Schema(_))));
}

#[test]
fn should_reject_invalid_regex_patterns() {
    let result = ScopeLoaderOptions::from_json(r#"{ "files": [{ "regex": "(" }] }"#);
    match result {
        Err(OptionsError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "("),
        other => panic!("expected an invalid-pattern error, got {:?}", other.err()),
    }
}
