//! Selector parsing and rewriting for the Moss preprocessor.
//!
//! # Scope
//!
//! This crate implements the selector subsystem of the compiler:
//!
//! - **Selector AST** ([Selectors Level 4 § 3](https://www.w3.org/TR/selectors-4/#structure))
//!   - Selector lists, complex selectors, compound selectors, and the
//!     closed set of simple selectors
//!   - The preprocessor extensions: placeholder selectors (`%name`) and
//!     parent references (`&`)
//!   - Structural equality/hashing and source-text rendering
//!
//! - **Selector Parser**
//!   - Backtracking recursive descent over the selector grammar
//!   - Compound-boundary and pseudo-argument ambiguity resolution
//!   - Newline tracking for formatted multi-line output
//!   - The `@at-root` query grammar
//!
//! - **Extend Engine** ([`@extend`](https://sass-lang.com/documentation/at-rules/extend/))
//!   - Extension-table population and subset lookup
//!   - Selector-list rewriting under the First Law of Extend
//!   - Parent-reference resolution for nested-rule flattening
//!
//! - **Script-value bridge** - selectors as generic list values for the
//!   expression sub-language
//!
//! # Not Implemented Here
//!
//! The surrounding stylesheet and declaration parser, interpolation and
//! the expression sub-language (only its injection seam appears here),
//! CSS serialization beyond a selector's own text, and import resolution
//! are separate components.

/// Selector syntax tree per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod ast;
/// The extend engine: table population, rewriting, parent resolution.
pub mod extend;
/// Recursive-descent selector parsing.
pub mod parser;
/// Script-value bridge for the expression sub-language.
pub mod value;
