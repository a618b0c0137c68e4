//! Selector parsing.

/// The `@at-root` query parser.
pub mod at_root;
/// The selector-list parser.
pub mod selector_parser;

pub use at_root::{AtRootQuery, AtRootQueryKind, parse_at_root_query};
pub use selector_parser::{InterpolationParser, SelectorParser, parse_selector};
