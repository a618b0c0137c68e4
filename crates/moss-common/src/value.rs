//! Generic script values.
//!
//! The expression sub-language is a separate component, but it introspects
//! selectors through this shared representation: a selector list converts
//! to a comma-separated list of space-separated lists of strings. Only the
//! pieces that bridge needs live here.

use std::fmt;

use serde::Serialize;
use strum_macros::Display;

/// How the items of a list value are joined when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum ListSeparator {
    /// Items joined with `", "`.
    #[strum(serialize = ", ")]
    Comma,
    /// Items joined with `" "`.
    #[strum(serialize = " ")]
    Space,
}

/// A script value: a plain string or a separated list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    /// A plain string value (`.foo`, `#bar`, `[attr=val]`, ...).
    String(String),
    /// A list of values with a separator.
    List {
        /// The list items, in order.
        items: Vec<Value>,
        /// The separator used between items when rendering.
        separator: ListSeparator,
    },
}

impl Value {
    /// Build a comma-separated list value.
    #[must_use]
    pub const fn comma_list(items: Vec<Self>) -> Self {
        Self::List {
            items,
            separator: ListSeparator::Comma,
        }
    }

    /// Build a space-separated list value.
    #[must_use]
    pub const fn space_list(items: Vec<Self>) -> Self {
        Self::List {
            items,
            separator: ListSeparator::Space,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::List { items, separator } => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{separator}")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
