//! Syntax errors raised by the selector parser and the extend engine.
//!
//! All failures in this compiler core are fatal to the current compilation:
//! there is no local recovery and no retry. Parse-time failures and
//! extend-time failures share one carrier type and are distinguished by
//! their messages.

use serde::Serialize;
use thiserror::Error;

use crate::position::SourcePosition;

/// A fatal syntax error with its source location.
///
/// The message usually starts with `expected ...` (required-token
/// mismatches) or names the violated rule (`can't extend nested
/// selectors`, `base-level rules cannot contain the parent-selector-
/// referencing character "&"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} on {} at {position}", .filename.as_deref().unwrap_or("<string>"))]
pub struct SyntaxError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Where in the source the error was raised.
    pub position: SourcePosition,
    /// The file being parsed, if known.
    pub filename: Option<String>,
}

impl SyntaxError {
    /// Create an error at the given position with no filename.
    #[must_use]
    pub fn new(message: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            message: message.into(),
            position,
            filename: None,
        }
    }

    /// Attach the name of the file being parsed.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}
