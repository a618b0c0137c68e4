//! Integration tests for the extend engine.

use moss_common::position::SourcePosition;
use moss_selector::ast::SelectorList;
use moss_selector::extend::{
    ExtendDirective, ExtensionTable, do_extend, populate_extends, resolve_parent_refs,
};
use moss_selector::parser::parse_selector;

fn parse(text: &str) -> SelectorList {
    parse_selector(text, None, SourcePosition::start(), false).unwrap()
}

fn parse_nested(text: &str) -> SelectorList {
    parse_selector(text, None, SourcePosition::start(), true).unwrap()
}

fn directive() -> ExtendDirective {
    ExtendDirective {
        line: 1,
        optional: false,
    }
}

/// Register `@extend <extendee>` appearing in a rule whose selector is
/// `extender`, at the document root.
fn register(table: &mut ExtensionTable, extender: &str, extendee: &str) {
    populate_extends(
        table,
        &parse(extender),
        &parse(extendee),
        directive(),
        &[],
    )
    .unwrap();
}

// do_extend

#[test]
fn test_noop_extension_returns_list_unchanged() {
    let table = ExtensionTable::new();
    let list = parse("a.foo, #bar > .baz");
    assert_eq!(do_extend(&list, &table, &[]), list);
}

#[test]
fn test_first_law_output_contains_base_selector() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".serious-error", ".error");

    let result = do_extend(&parse(".error"), &table, &[]);
    assert_eq!(result, parse(".serious-error, .error"));
}

#[test]
fn test_residue_is_unified_into_extender() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".serious-error", ".error");

    let result = do_extend(&parse(".error.intro"), &table, &[]);
    assert_eq!(result, parse(".serious-error.intro, .error.intro"));
}

#[test]
fn test_element_residue_leads_unified_compound() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".serious-error", ".error");

    let result = do_extend(&parse("div.error"), &table, &[]);
    assert_eq!(result, parse("div.serious-error, div.error"));
}

#[test]
fn test_extension_applies_at_any_compound_position() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".serious-error", ".error");

    let result = do_extend(&parse("nav .error > a"), &table, &[]);
    assert_eq!(result, parse("nav .serious-error > a, nav .error > a"));
}

#[test]
fn test_extender_leading_components_are_spliced() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".alert > .icon", ".error");

    let result = do_extend(&parse("nav .error"), &table, &[]);
    assert_eq!(result, parse("nav .alert > .icon, nav .error"));
}

#[test]
fn test_multi_key_target_matches_subset() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".both", ".a.b");

    // `.a.b.c` contains the key set {.a, .b}; `.a.c` does not.
    let result = do_extend(&parse(".a.b.c, .a.c"), &table, &[]);
    assert_eq!(result, parse(".both.c, .a.b.c, .a.c"));
}

#[test]
fn test_conflicting_ids_are_not_unified() {
    let mut table = ExtensionTable::new();
    register(&mut table, "#one", ".shared");

    let result = do_extend(&parse("#two.shared"), &table, &[]);
    assert_eq!(result, parse("#two.shared"));
}

#[test]
fn test_conflicting_elements_are_not_unified() {
    let mut table = ExtensionTable::new();
    register(&mut table, "span.link", ".link-like");

    let result = do_extend(&parse("a.link-like"), &table, &[]);
    assert_eq!(result, parse("a.link-like"));
}

#[test]
fn test_pure_placeholder_member_is_dropped_unless_extended() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".btn", "%button");

    let result = do_extend(&parse("%button"), &table, &[]);
    assert_eq!(result, parse(".btn"));

    // Nothing extends %other: its batch is empty and the member vanishes.
    let unextended = do_extend(&parse("%other"), &table, &[]);
    assert!(unextended.members.is_empty());
}

#[test]
fn test_placeholder_with_other_selectors_survives() {
    let table = ExtensionTable::new();
    let list = parse(".real%partial");
    assert_eq!(do_extend(&list, &table, &[]), list);
}

#[test]
fn test_duplicates_within_one_batch_are_removed() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".winner", ".a");
    register(&mut table, ".winner", ".a");

    let result = do_extend(&parse(".a"), &table, &[]);
    assert_eq!(result, parse(".winner, .a"));
}

#[test]
fn test_independent_keys_produce_independent_alternatives() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".winner", ".a");
    register(&mut table, ".winner", ".b");

    let result = do_extend(&parse(".a.b"), &table, &[]);
    assert_eq!(result, parse(".winner.b, .winner.a, .a.b"));
}

#[test]
fn test_duplicates_across_members_are_preserved() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".new", ".old");

    let result = do_extend(&parse(".old, .old"), &table, &[]);
    assert_eq!(result, parse(".new, .old, .new, .old"));
}

#[test]
fn test_alternatives_follow_registration_order() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".first", ".x");
    register(&mut table, ".second", ".x");

    let result = do_extend(&parse(".x"), &table, &[]);
    assert_eq!(result, parse(".first, .second, .x"));
}

#[test]
fn test_context_restricted_entry_only_applies_in_context() {
    let mut table = ExtensionTable::new();
    let context = vec!["media".to_string()];
    populate_extends(
        &mut table,
        &parse(".wide"),
        &parse(".col"),
        directive(),
        &context,
    )
    .unwrap();

    // Outside the at-rule the entry is inert.
    assert_eq!(do_extend(&parse(".col"), &table, &[]), parse(".col"));
    // Inside it, it rewrites.
    assert_eq!(
        do_extend(&parse(".col"), &table, &context),
        parse(".wide, .col")
    );
}

#[test]
fn test_do_extend_does_not_mutate_input() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".new", ".old");

    let list = parse(".old");
    let before = list.clone();
    let _ = do_extend(&list, &table, &[]);
    assert_eq!(list, before);
}

// populate_extends validation

#[test]
fn test_populate_rejects_nested_extendee() {
    let mut table = ExtensionTable::new();
    let err = populate_extends(
        &mut table,
        &parse(".x"),
        &parse(".a .b"),
        directive(),
        &[],
    )
    .unwrap_err();
    assert_eq!(err.message, "can't extend nested selectors");
}

#[test]
fn test_populate_rejects_parent_ref_extendee() {
    let mut table = ExtensionTable::new();
    let err = populate_extends(
        &mut table,
        &parse(".x"),
        &parse_nested("&"),
        directive(),
        &[],
    )
    .unwrap_err();
    assert_eq!(err.message, "can't extend parent selectors");
}

#[test]
fn test_populate_rejects_lone_combinator_extendee() {
    let mut table = ExtensionTable::new();
    let err = populate_extends(&mut table, &parse(".x"), &parse(">"), directive(), &[])
        .unwrap_err();
    assert_eq!(err.message, "invalid selector");
}

#[test]
fn test_populate_rejects_trailing_combinator_extender() {
    let mut table = ExtensionTable::new();
    let err = populate_extends(
        &mut table,
        &parse("a >"),
        &parse(".x"),
        directive(),
        &[],
    )
    .unwrap_err();
    assert_eq!(err.message, "trailing combinator can't extend");
}

#[test]
fn test_populate_registers_all_pairs() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".x, .y", ".a, .b");
    assert_eq!(table.len(), 4);
}

// matched status and the unused-extend diagnostic

#[test]
fn test_unmatched_entries_after_rewriting() {
    let mut table = ExtensionTable::new();
    register(&mut table, ".used", ".a");
    register(&mut table, ".unused", ".nowhere");

    let _ = do_extend(&parse(".a"), &table, &[]);
    let unmatched: Vec<_> = table.unmatched_entries().collect();
    assert_eq!(unmatched.len(), 1);

    let err = table.assert_all_matched().unwrap_err();
    assert!(err.message.contains("was not found"), "got: {}", err.message);
    assert!(err.message.contains(".nowhere"), "got: {}", err.message);
}

#[test]
fn test_optional_extends_are_exempt_from_diagnostic() {
    let mut table = ExtensionTable::new();
    populate_extends(
        &mut table,
        &parse(".x"),
        &parse(".nowhere"),
        ExtendDirective {
            line: 1,
            optional: true,
        },
        &[],
    )
    .unwrap();

    assert_eq!(table.unmatched_entries().count(), 1);
    table.assert_all_matched().unwrap();
}

// resolve_parent_refs

#[test]
fn test_parent_ref_fused_with_class() {
    let resolved = resolve_parent_refs(&parse_nested("&.foo"), Some(&parse(".bar")), true).unwrap();
    assert_eq!(resolved, parse(".bar.foo"));
}

#[test]
fn test_implicit_parent_descendant_composition() {
    let resolved = resolve_parent_refs(&parse(".foo"), Some(&parse(".bar")), true).unwrap();
    assert_eq!(resolved, parse(".bar .foo"));
}

#[test]
fn test_implicit_parent_disabled() {
    let resolved = resolve_parent_refs(&parse(".foo"), Some(&parse(".bar")), false).unwrap();
    assert_eq!(resolved, parse(".foo"));
}

#[test]
fn test_base_level_parent_ref_fails() {
    let err = resolve_parent_refs(&parse_nested("&"), None, true).unwrap_err();
    assert!(
        err.message.contains("base-level rules"),
        "got: {}",
        err.message
    );
}

#[test]
fn test_no_super_and_no_refs_returns_unchanged() {
    let list = parse(".foo > a");
    assert_eq!(resolve_parent_refs(&list, None, true).unwrap(), list);
}

#[test]
fn test_bare_parent_ref_takes_super_verbatim() {
    let resolved =
        resolve_parent_refs(&parse_nested("& a"), Some(&parse(".nav > ul")), true).unwrap();
    assert_eq!(resolved, parse(".nav > ul a"));
}

#[test]
fn test_parent_ref_suffix_concatenates() {
    let resolved =
        resolve_parent_refs(&parse_nested("&-sidebar"), Some(&parse(".nav")), true).unwrap();
    assert_eq!(resolved, parse(".nav-sidebar"));
}

#[test]
fn test_parent_ref_suffix_on_element() {
    let resolved = resolve_parent_refs(&parse_nested("&-x"), Some(&parse("a.btn")), true).unwrap();
    assert_eq!(resolved, parse("a.btn-x"));
}

#[test]
fn test_parent_ref_suffix_on_universal_fails() {
    let err = resolve_parent_refs(&parse_nested("&-x"), Some(&parse("*")), true).unwrap_err();
    assert!(
        err.message.contains("invalid parent selector"),
        "got: {}",
        err.message
    );
}

#[test]
fn test_substitution_expands_across_super_members() {
    let resolved =
        resolve_parent_refs(&parse_nested("&:hover"), Some(&parse(".a, .b")), true).unwrap();
    assert_eq!(resolved, parse(".a:hover, .b:hover"));
}

#[test]
fn test_implicit_parent_expands_across_super_members() {
    let resolved = resolve_parent_refs(&parse(".x"), Some(&parse(".a, .b")), true).unwrap();
    assert_eq!(resolved, parse(".a .x, .b .x"));
}

#[test]
fn test_multiple_refs_expand_to_cross_product() {
    let resolved = resolve_parent_refs(&parse_nested("& &"), Some(&parse(".a, .b")), true).unwrap();
    assert_eq!(resolved, parse(".a .a, .a .b, .b .a, .b .b"));
}

#[test]
fn test_mixed_members_preserve_order() {
    let resolved =
        resolve_parent_refs(&parse_nested("&.on, .child"), Some(&parse(".btn")), true).unwrap();
    assert_eq!(resolved, parse(".btn.on, .btn .child"));
}
