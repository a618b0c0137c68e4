//! Shared infrastructure for the Moss compiler.
//!
//! This crate provides the pieces every compilation phase leans on:
//! - **Positions & spans** - where in the source something lives
//! - **Syntax errors** - the single fatal error carrier for parse and
//!   rewrite failures
//! - **Scanner** - a position-tracked character cursor with checkpointed
//!   backtracking
//! - **Warnings** - deduplicated colored terminal warnings
//! - **Script values** - the generic value representation the expression
//!   evaluator introspects

/// Syntax error carrier used by the parser and the extend engine.
pub mod error;
/// Source positions and spans.
pub mod position;
/// Character scanner with checkpointed backtracking.
pub mod scanner;
/// Generic script values (strings and separated lists).
pub mod value;
/// Deduplicated compiler warnings.
pub mod warning;
