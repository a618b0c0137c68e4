//! Simple selectors.
//!
//! [§ 3.1 Structure](https://www.w3.org/TR/selectors-4/#structure)
//! "A simple selector is a single condition on an element."
//!
//! On top of the standard CSS simple selectors, the preprocessor adds two
//! of its own: placeholder selectors
//! ([`%name`](https://sass-lang.com/documentation/style-rules/placeholder-selectors/)),
//! which exist only to be extended and never reach the output, and parent
//! references
//! ([`&`](https://sass-lang.com/documentation/style-rules/parent-selector/)),
//! which nested rules use to refer to the selector of their enclosing rule.

use std::fmt;

use serde::Serialize;
use strum_macros::Display;

/// A namespace prefix on a type, universal, or attribute selector.
///
/// [§ 5.3 Type selectors and namespaces](https://www.w3.org/TR/selectors-4/#type-nmsp)
/// "Type selectors and universal selectors allow an optional namespace
/// component: a namespace prefix that has been previously declared may be
/// prepended to the element name separated by the namespace separator
/// 'vertical bar' (| U+007C)."
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum NamespacePrefix {
    /// A declared namespace: `ns|name`.
    Named(String),
    /// Any namespace: `*|name`.
    Any,
    /// The empty (null) namespace: `|name`.
    Empty,
}

impl fmt::Display for NamespacePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(ns) => write!(f, "{ns}|"),
            Self::Any => write!(f, "*|"),
            Self::Empty => write!(f, "|"),
        }
    }
}

/// Attribute match operators per
/// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
/// and [§ 6.2 Substring matching](https://www.w3.org/TR/selectors-4/#attribute-substrings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum AttributeOp {
    /// `[attr=value]` - exact match.
    #[strum(serialize = "=")]
    Equals,
    /// `[attr~=value]` - whitespace-separated word match.
    #[strum(serialize = "~=")]
    Includes,
    /// `[attr|=value]` - exact match or prefix followed by `-`.
    #[strum(serialize = "|=")]
    DashMatch,
    /// `[attr^=value]` - prefix match.
    #[strum(serialize = "^=")]
    PrefixMatch,
    /// `[attr$=value]` - suffix match.
    #[strum(serialize = "$=")]
    SuffixMatch,
    /// `[attr*=value]` - substring match.
    #[strum(serialize = "*=")]
    SubstringMatch,
}

/// Whether a pseudo selector was written with one colon or two.
///
/// [§ 4.4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes),
/// [§ 4.5 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements):
/// the colon count selects the kind but does not constrain which names are
/// valid - that validation is semantic and happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PseudoKind {
    /// `:name` - a pseudo-class.
    Class,
    /// `::name` - a pseudo-element.
    Element,
}

/// A single condition on an element.
///
/// This is a closed set: every operation over simple selectors (rendering,
/// placeholder checks, parent-reference substitution) matches exhaustively
/// so adding a variant is a compile error everywhere it matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SimpleSelector {
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal {
        /// Optional namespace prefix (`ns|*`, `*|*`, `|*`).
        namespace: Option<NamespacePrefix>,
    },

    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type."
    Element {
        /// The element name.
        name: String,
        /// Optional namespace prefix.
        namespace: Option<NamespacePrefix>,
    },

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// `.name`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// `#name`
    Id(String),

    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    /// `[ns|name op value flags]` with every part after the name optional.
    Attribute {
        /// The attribute name.
        name: String,
        /// Optional namespace prefix on the attribute name.
        namespace: Option<NamespacePrefix>,
        /// The match operator, if a value comparison was written.
        op: Option<AttributeOp>,
        /// The comparison value, raw as written (strings keep their
        /// quotes).
        value: Option<String>,
        /// Trailing flag token (e.g. the `i` case-insensitivity marker of
        /// [§ 6.3](https://www.w3.org/TR/selectors-4/#attribute-case)).
        flags: Option<String>,
    },

    /// A pseudo-class or pseudo-element, with an optional argument kept as
    /// text (`:nth-child(2n+1)`, `:not(.foo)`, `::before`).
    Pseudo {
        /// One colon or two.
        kind: PseudoKind,
        /// The pseudo name.
        name: String,
        /// The textual argument, if parenthesized arguments were written.
        argument: Option<String>,
    },

    /// [Placeholder selector](https://sass-lang.com/documentation/style-rules/placeholder-selectors/)
    /// `%name` - "it looks and acts a lot like a class selector, but it
    /// starts with a % and it's not included in the CSS output." Valid
    /// only as an extend target.
    Placeholder(String),

    /// [Parent selector](https://sass-lang.com/documentation/style-rules/parent-selector/)
    /// `&` - replaced by the enclosing rule's resolved selector when
    /// nested rules are flattened. An immediately following identifier
    /// becomes a suffix spliced onto the parent
    /// (`&-sidebar`).
    ParentRef {
        /// Optional suffix appended to the substituted parent.
        suffix: Option<String>,
    },
}

impl SimpleSelector {
    /// Whether this is a parent reference (`&`).
    #[must_use]
    pub const fn is_parent_ref(&self) -> bool {
        matches!(self, Self::ParentRef { .. })
    }

    /// Whether this is a placeholder selector (`%name`).
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Whether this is a pseudo-class or pseudo-element.
    #[must_use]
    pub const fn is_pseudo(&self) -> bool {
        matches!(self, Self::Pseudo { .. })
    }

    /// Append a parent-reference suffix to this selector's name.
    ///
    /// `&-sidebar` resolved against `.nav` produces `.nav-sidebar`: the
    /// suffix concatenates onto the final simple selector of the parent.
    /// Only named selectors can take a suffix; anything else returns
    /// `None` and the caller reports an invalid parent selector.
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Option<Self> {
        match self {
            Self::Element { name, namespace } => Some(Self::Element {
                name: format!("{name}{suffix}"),
                namespace: namespace.clone(),
            }),
            Self::Class(name) => Some(Self::Class(format!("{name}{suffix}"))),
            Self::Id(name) => Some(Self::Id(format!("{name}{suffix}"))),
            Self::Placeholder(name) => Some(Self::Placeholder(format!("{name}{suffix}"))),
            Self::Universal { .. }
            | Self::Attribute { .. }
            | Self::Pseudo { .. }
            | Self::ParentRef { .. } => None,
        }
    }
}

/// Render an optional namespace prefix (nothing when no prefix was
/// written).
fn write_namespace(
    f: &mut fmt::Formatter<'_>,
    namespace: Option<&NamespacePrefix>,
) -> fmt::Result {
    match namespace {
        Some(ns) => write!(f, "{ns}"),
        None => Ok(()),
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal { namespace } => {
                write_namespace(f, namespace.as_ref())?;
                write!(f, "*")
            }
            Self::Element { name, namespace } => {
                write_namespace(f, namespace.as_ref())?;
                write!(f, "{name}")
            }
            Self::Class(name) => write!(f, ".{name}"),
            Self::Id(name) => write!(f, "#{name}"),
            Self::Attribute {
                name,
                namespace,
                op,
                value,
                flags,
            } => {
                write!(f, "[")?;
                write_namespace(f, namespace.as_ref())?;
                write!(f, "{name}")?;
                if let (Some(op), Some(value)) = (op, value) {
                    write!(f, "{op}{value}")?;
                }
                if let Some(flags) = flags {
                    write!(f, " {flags}")?;
                }
                write!(f, "]")
            }
            Self::Pseudo {
                kind,
                name,
                argument,
            } => {
                match kind {
                    PseudoKind::Class => write!(f, ":{name}")?,
                    PseudoKind::Element => write!(f, "::{name}")?,
                }
                match argument {
                    Some(argument) => write!(f, "({argument})"),
                    None => Ok(()),
                }
            }
            Self::Placeholder(name) => write!(f, "%{name}"),
            Self::ParentRef { suffix } => {
                write!(f, "&")?;
                match suffix {
                    Some(suffix) => write!(f, "{suffix}"),
                    None => Ok(()),
                }
            }
        }
    }
}
