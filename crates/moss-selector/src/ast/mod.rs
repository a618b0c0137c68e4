//! Selector syntax tree.
//!
//! [§ 3.1 Structure](https://www.w3.org/TR/selectors-4/#structure)
//! "A selector represents a particular pattern of element(s) in a tree
//! structure."
//!
//! All nodes are immutable value objects: parsing, parent resolution, and
//! extension always build new trees and never mutate shared ones. Equality
//! and hashing are structural and order-sensitive - they drive the
//! deduplication inside the extend engine and the keys of the extension
//! table - and deliberately ignore formatting metadata (newline markers)
//! and source spans.

/// Simple selector variants.
pub mod simple;

use std::fmt;
use std::hash::{Hash, Hasher};

use moss_common::position::Span;
use serde::Serialize;

pub use simple::{AttributeOp, NamespacePrefix, PseudoKind, SimpleSelector};

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Combinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A descendant combinator is whitespace that separates two compound
    /// selectors." Implicit in the source; materialized as an explicit
    /// component so rewriting can treat every compound boundary uniformly.
    Descendant,

    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// `A > B`
    Child,

    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// `A + B`
    AdjacentSibling,

    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// `A ~ B`
    GeneralSibling,

    /// The reference combinator `A /attr/ B` from early Selectors Level 4
    /// drafts. Nonstandard; kept for compatibility with stylesheets that
    /// use it.
    Reference {
        /// Optional namespace prefix on the referenced attribute.
        namespace: Option<NamespacePrefix>,
        /// The referenced attribute name.
        name: String,
    },
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Descendant is whitespace; the complex-selector renderer
            // space-joins the non-empty pieces.
            Self::Descendant => Ok(()),
            Self::Child => write!(f, ">"),
            Self::AdjacentSibling => write!(f, "+"),
            Self::GeneralSibling => write!(f, "~"),
            Self::Reference { namespace, name } => {
                write!(f, "/")?;
                if let Some(ns) = namespace {
                    write!(f, "{ns}")?;
                }
                write!(f, "{name}/")
            }
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, Serialize)]
pub struct CompoundSelector {
    /// The simple selectors, in source order (order matters for output,
    /// not for matching).
    pub simple_selectors: Vec<SimpleSelector>,
    /// Whether the compound carried a trailing `!` subject indicator (a
    /// legacy hack accepted for compatibility).
    pub important_hack: bool,
    /// The range of source text this compound was parsed from. Ignored by
    /// equality and hashing.
    pub span: Span,
}

impl CompoundSelector {
    /// Create a compound selector over the given simple selectors.
    #[must_use]
    pub const fn new(simple_selectors: Vec<SimpleSelector>, span: Span) -> Self {
        Self {
            simple_selectors,
            important_hack: false,
            span,
        }
    }

    /// Whether any simple selector in this compound is a parent reference.
    #[must_use]
    pub fn contains_parent_ref(&self) -> bool {
        self.simple_selectors.iter().any(SimpleSelector::is_parent_ref)
    }

    /// Whether every simple selector in this compound is a placeholder.
    #[must_use]
    pub fn is_placeholder_only(&self) -> bool {
        self.simple_selectors.iter().all(SimpleSelector::is_placeholder)
    }
}

impl PartialEq for CompoundSelector {
    /// Structural equality over the simple selectors and the hack flag;
    /// the source span is metadata and never participates.
    fn eq(&self, other: &Self) -> bool {
        self.simple_selectors == other.simple_selectors
            && self.important_hack == other.important_hack
    }
}

impl Eq for CompoundSelector {}

impl Hash for CompoundSelector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.simple_selectors.hash(state);
        self.important_hack.hash(state);
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for simple in &self.simple_selectors {
            write!(f, "{simple}")?;
        }
        if self.important_hack {
            write!(f, "!")?;
        }
        Ok(())
    }
}

/// What a single position in a complex selector holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentKind {
    /// A compound selector.
    Compound(CompoundSelector),
    /// A combinator between compounds.
    Combinator(Combinator),
}

/// One item in a complex selector's component sequence, with its
/// formatting metadata.
///
/// The newline marker records that the source had a line break immediately
/// before this item; downstream formatting uses it to reproduce multi-line
/// selector lists in diagnostics. It is not a selector component and is
/// ignored by equality and hashing.
#[derive(Debug, Clone, Serialize)]
pub struct SelectorComponent {
    /// The compound selector or combinator at this position.
    pub kind: ComponentKind,
    /// Whether a newline appeared in the source immediately before this
    /// item.
    pub preceded_by_newline: bool,
}

impl SelectorComponent {
    /// Wrap a compound selector as a component (no newline marker).
    #[must_use]
    pub const fn compound(compound: CompoundSelector) -> Self {
        Self {
            kind: ComponentKind::Compound(compound),
            preceded_by_newline: false,
        }
    }

    /// Wrap a combinator as a component (no newline marker).
    #[must_use]
    pub const fn combinator(combinator: Combinator) -> Self {
        Self {
            kind: ComponentKind::Combinator(combinator),
            preceded_by_newline: false,
        }
    }

    /// The compound selector at this position, if it holds one.
    #[must_use]
    pub const fn as_compound(&self) -> Option<&CompoundSelector> {
        match &self.kind {
            ComponentKind::Compound(compound) => Some(compound),
            ComponentKind::Combinator(_) => None,
        }
    }

    /// Whether this position holds a compound selector.
    #[must_use]
    pub const fn is_compound(&self) -> bool {
        matches!(self.kind, ComponentKind::Compound(_))
    }
}

impl PartialEq for SelectorComponent {
    /// Structural equality over the selector content only; the newline
    /// marker is formatting metadata.
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for SelectorComponent {}

impl Hash for SelectorComponent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl fmt::Display for SelectorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ComponentKind::Compound(compound) => write!(f, "{compound}"),
            ComponentKind::Combinator(combinator) => write!(f, "{combinator}"),
        }
    }
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
/// "A complex selector is a chain of one or more compound selectors
/// separated by combinators."
///
/// Stored left to right as parsed. Adjacent compounds are always separated
/// by a combinator component (the implicit descendant combinator is
/// materialized), so rewriting can splice at any compound boundary without
/// special cases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ComplexSelector {
    /// The compounds and combinators, in source order. Never empty.
    pub components: Vec<SelectorComponent>,
}

impl ComplexSelector {
    /// Create a complex selector from its components.
    #[must_use]
    pub const fn new(components: Vec<SelectorComponent>) -> Self {
        Self { components }
    }

    /// Whether the source had a line break before this selector (set on
    /// list members that followed a comma-then-newline).
    #[must_use]
    pub fn preceded_by_newline(&self) -> bool {
        self.components
            .first()
            .is_some_and(|component| component.preceded_by_newline)
    }

    /// Whether any compound in this selector contains a parent reference.
    #[must_use]
    pub fn contains_parent_ref(&self) -> bool {
        self.components
            .iter()
            .filter_map(SelectorComponent::as_compound)
            .any(CompoundSelector::contains_parent_ref)
    }

    /// Whether this selector consists solely of placeholder selectors.
    ///
    /// Such a member exists only to be extended: it never survives to
    /// rendered output on its own.
    #[must_use]
    pub fn is_pure_placeholder(&self) -> bool {
        self.components.iter().all(|component| {
            component
                .as_compound()
                .is_some_and(CompoundSelector::is_placeholder_only)
        })
    }

    /// The final component, if it is a compound selector.
    ///
    /// Extenders must end in a compound - a trailing combinator has
    /// nothing to attach the extension to.
    #[must_use]
    pub fn trailing_compound(&self) -> Option<&CompoundSelector> {
        self.components.last().and_then(SelectorComponent::as_compound)
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            let rendered = component.to_string();
            // Descendant combinators render as nothing; the surrounding
            // whitespace is the separator itself.
            if rendered.is_empty() {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{rendered}")?;
            first = false;
        }
        Ok(())
    }
}

/// [§ 5.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
/// "A selector list is a comma-separated list of selectors" with
/// alternation semantics. Order is significant and preserved on output.
#[derive(Debug, Clone, Serialize)]
pub struct SelectorList {
    /// The alternatives, in source order. Never empty after a successful
    /// parse.
    pub members: Vec<ComplexSelector>,
    /// 1-based line the list started on. Ignored by equality and hashing.
    pub line: u32,
    /// The file the list was parsed from, if known. Ignored by equality
    /// and hashing.
    pub filename: Option<String>,
}

impl SelectorList {
    /// Create a list with no source tag (line 1, no filename).
    #[must_use]
    pub const fn new(members: Vec<ComplexSelector>) -> Self {
        Self {
            members,
            line: 1,
            filename: None,
        }
    }

    /// Attach the source line and filename the list was parsed from.
    #[must_use]
    pub fn with_source(mut self, line: u32, filename: Option<String>) -> Self {
        self.line = line;
        self.filename = filename;
        self
    }

    /// Whether any member contains a parent reference.
    #[must_use]
    pub fn contains_parent_ref(&self) -> bool {
        self.members.iter().any(ComplexSelector::contains_parent_ref)
    }
}

impl PartialEq for SelectorList {
    /// Element-wise structural equality over the members; the source tag
    /// is metadata and never participates.
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for SelectorList {}

impl Hash for SelectorList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.members.hash(state);
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                if member.preceded_by_newline() {
                    writeln!(f, ",")?;
                } else {
                    write!(f, ", ")?;
                }
            }
            write!(f, "{member}")?;
        }
        Ok(())
    }
}
