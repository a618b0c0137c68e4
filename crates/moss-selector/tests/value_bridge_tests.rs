//! Integration tests for the script-value bridge and AST serialization.

use moss_common::position::SourcePosition;
use moss_common::value::{ListSeparator, Value};
use moss_selector::ast::SelectorList;
use moss_selector::parser::parse_selector;

fn parse(text: &str) -> SelectorList {
    parse_selector(text, None, SourcePosition::start(), false).unwrap()
}

#[test]
fn test_selector_converts_to_two_level_list() {
    let value = parse("a .b, #c").to_value();
    let Value::List { items, separator } = &value else {
        panic!("expected a list value");
    };
    assert_eq!(*separator, ListSeparator::Comma);
    assert_eq!(items.len(), 2);

    let Value::List { items: inner, separator } = &items[0] else {
        panic!("expected an inner list");
    };
    assert_eq!(*separator, ListSeparator::Space);
    assert_eq!(
        inner,
        &vec![
            Value::String("a".to_string()),
            Value::String(".b".to_string())
        ]
    );
}

#[test]
fn test_combinators_become_their_own_leaves() {
    let value = parse("a > b").to_value();
    let Value::List { items, .. } = &value else {
        panic!("expected a list value");
    };
    let Value::List { items: inner, .. } = &items[0] else {
        panic!("expected an inner list");
    };
    assert_eq!(
        inner,
        &vec![
            Value::String("a".to_string()),
            Value::String(">".to_string()),
            Value::String("b".to_string())
        ]
    );
}

#[test]
fn test_value_rendering_matches_selector_rendering() {
    for text in ["a", "a > b", "a .b, #c", ".foo.bar:hover"] {
        assert_eq!(parse(text).to_value().to_string(), parse(text).to_string());
    }
}

#[test]
fn test_ast_serializes_to_json() {
    let json = serde_json::to_string(&parse(".foo > #bar")).unwrap();
    assert!(json.contains("\"members\""), "got: {json}");
    assert!(json.contains("\"Class\""), "got: {json}");
    assert!(json.contains("\"Child\""), "got: {json}");
}
