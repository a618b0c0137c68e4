//! The extend engine.
//!
//! [`@extend`](https://sass-lang.com/documentation/at-rules/extend/)
//! "tells Sass that one selector should inherit the styles of another."
//! The engine works in two phases over one shared table: the flattening
//! pass first scans the whole document for extend directives and registers
//! them here ([`populate_extends`]), then rewrites every rule's selector
//! list against the finished table ([`do_extend`]). The table is
//! append-only during population and read-only during rewriting; the two
//! phases must not interleave on one table without external
//! synchronization.
//!
//! Both operations are pure over immutable selector trees: rewriting
//! always returns a new list and never mutates its input.

/// Parent-reference resolution for nested rules.
pub mod parent;

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt::Write;

use moss_common::error::SyntaxError;
use moss_common::position::SourcePosition;

pub use parent::resolve_parent_refs;

use crate::ast::{
    ComplexSelector, ComponentKind, CompoundSelector, SelectorComponent, SelectorList,
    SimpleSelector,
};

/// The `@extend` directive an extension was registered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendDirective {
    /// 1-based source line of the directive.
    pub line: u32,
    /// Whether the directive was marked `!optional`. Optional extends are
    /// exempt from the unused-extend diagnostic.
    pub optional: bool,
}

/// One registered extension: "rules matching the target should also
/// receive the extender's declarations and context".
#[derive(Debug, Clone)]
pub struct ExtensionEntry {
    /// The selector that extends (the selector of the rule the directive
    /// appeared in). Always ends in a compound selector.
    pub extender: ComplexSelector,
    /// The extended key set: the simple selectors of the target compound.
    pub target: Vec<SimpleSelector>,
    /// The originating directive.
    pub directive: ExtendDirective,
    /// The at-rule context chain the directive appeared under (directive
    /// names, outermost first).
    pub context: Vec<String>,
    /// Flipped the first time this entry rewrites a rule; the
    /// unused-extend diagnostic pass reads it afterwards.
    matched: Cell<bool>,
}

impl ExtensionEntry {
    /// Whether this entry has rewritten at least one rule.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.matched.get()
    }

    /// Whether this entry may rewrite a rule under the given at-rule
    /// context chain. An extend registered inside an at-rule cannot reach
    /// rules outside that at-rule.
    fn applies_in(&self, context: &[String]) -> bool {
        self.context.is_empty() || self.context == context
    }

    /// The target key set rendered as source text.
    fn render_target(&self) -> String {
        let mut text = String::new();
        for simple in &self.target {
            // Writing to a String cannot fail.
            let _ = write!(text, "{simple}");
        }
        text
    }
}

/// The subset-lookup table extensions are registered into.
///
/// Keys are simple-selector sets; the query answers "which registered key
/// sets are subsets of this candidate compound's simple selectors". An
/// index from each simple selector to the entries keyed on it keeps the
/// query from scanning unrelated entries.
#[derive(Debug, Default)]
pub struct ExtensionTable {
    entries: Vec<ExtensionEntry>,
    index: HashMap<SimpleSelector, Vec<usize>>,
}

impl ExtensionTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered entries, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[ExtensionEntry] {
        &self.entries
    }

    /// Entries that never rewrote any rule.
    pub fn unmatched_entries(&self) -> impl Iterator<Item = &ExtensionEntry> {
        self.entries.iter().filter(|entry| !entry.is_matched())
    }

    /// Fail if any non-optional extend never found its target.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] naming the first unmatched, non-optional
    /// extend target.
    pub fn assert_all_matched(&self) -> Result<(), SyntaxError> {
        for entry in self.unmatched_entries() {
            if entry.directive.optional {
                continue;
            }
            let target = entry.render_target();
            return Err(SyntaxError::new(
                format!(
                    "the @extend target \"{target}\" was not found; \
                     use \"@extend {target} !optional\" if the extend should be skipped"
                ),
                SourcePosition::new(entry.directive.line, 1, 0),
            ));
        }
        Ok(())
    }

    fn insert(&mut self, entry: ExtensionEntry) {
        let index = self.entries.len();
        for key in &entry.target {
            self.index.entry(key.clone()).or_default().push(index);
        }
        self.entries.push(entry);
    }

    /// Indices of entries whose key set is a subset of `candidate`, in
    /// registration order.
    fn query(&self, candidate: &[SimpleSelector]) -> Vec<usize> {
        let mut indices: Vec<usize> = candidate
            .iter()
            .filter_map(|simple| self.index.get(simple))
            .flatten()
            .copied()
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices.retain(|&index| {
            self.entries[index]
                .target
                .iter()
                .all(|key| candidate.contains(key))
        });
        indices
    }
}

/// Register the extensions declared by one `@extend` directive.
///
/// `extendee_list` is the directive's selector argument (what is being
/// extended); `extender_list` is the selector of the rule the directive
/// appears in (what the extension rewrites other rules into).
///
/// # Errors
///
/// Returns a [`SyntaxError`] when an extendee member has more than one
/// compound (`can't extend nested selectors`), is a lone combinator
/// (`invalid selector`), or contains a parent reference (`can't extend
/// parent selectors`); or when an extender member ends in a combinator
/// (`trailing combinator can't extend`).
pub fn populate_extends(
    table: &mut ExtensionTable,
    extender_list: &SelectorList,
    extendee_list: &SelectorList,
    directive: ExtendDirective,
    context: &[String],
) -> Result<(), SyntaxError> {
    let mut targets = Vec::new();
    for member in &extendee_list.members {
        let compound = match member.components.as_slice() {
            [only] => match &only.kind {
                ComponentKind::Compound(compound) => compound,
                ComponentKind::Combinator(_) => {
                    return Err(list_error(extendee_list, "invalid selector"));
                }
            },
            _ => return Err(list_error(extendee_list, "can't extend nested selectors")),
        };
        if compound.contains_parent_ref() {
            return Err(list_error(extendee_list, "can't extend parent selectors"));
        }
        targets.push(compound.simple_selectors.clone());
    }

    for member in &extender_list.members {
        if member.trailing_compound().is_none() {
            return Err(list_error(extender_list, "trailing combinator can't extend"));
        }
    }

    for target in targets {
        for member in &extender_list.members {
            table.insert(ExtensionEntry {
                extender: member.clone(),
                target: target.clone(),
                directive,
                context: context.to_vec(),
                matched: Cell::new(false),
            });
        }
    }
    Ok(())
}

/// Rewrite a rule's selector list against the finished extension table.
///
/// Each member contributes the alternatives implied by the applicable
/// extensions, in registration order, followed by the member itself - the
/// First Law of Extend: the result of extending a selector always
/// contains the base selector. The one exception is a member consisting
/// solely of placeholder selectors, which never survives to output on its
/// own. Duplicates are removed within one member's batch only; duplicates
/// across members are preserved for later context-sensitive merging.
#[must_use]
pub fn do_extend(list: &SelectorList, table: &ExtensionTable, context: &[String]) -> SelectorList {
    let mut members = Vec::new();

    for member in &list.members {
        let mut batch: Vec<(usize, ComplexSelector)> = Vec::new();
        for (position, component) in member.components.iter().enumerate() {
            let ComponentKind::Compound(compound) = &component.kind else {
                continue;
            };
            for index in table.query(&compound.simple_selectors) {
                let entry = &table.entries[index];
                if !entry.applies_in(context) {
                    continue;
                }
                let Some(unified) = unify_with_extender(compound, entry) else {
                    continue;
                };

                // Splice the extender in place of the matched compound:
                // its leading components, then the unified compound, then
                // the rest of the original member. Compounds are always
                // separated by combinator components, so no separators
                // need inventing.
                let mut components: Vec<SelectorComponent> =
                    member.components[..position].to_vec();
                let lead = &entry.extender.components[..entry.extender.components.len() - 1];
                components.extend(lead.iter().cloned());
                components.push(SelectorComponent::compound(unified));
                components.extend(member.components[position + 1..].iter().cloned());

                batch.push((index, ComplexSelector::new(components)));
                entry.matched.set(true);
            }
        }

        // Registration order within the member's batch; the sort is
        // stable, so one entry matching several positions keeps position
        // order.
        batch.sort_by_key(|&(index, _)| index);

        let mut alternatives: Vec<ComplexSelector> = Vec::new();
        for (_, alternative) in batch {
            if !alternatives.contains(&alternative) {
                alternatives.push(alternative);
            }
        }

        // First Law of Extend.
        if !member.is_pure_placeholder() && !alternatives.contains(member) {
            alternatives.push(member.clone());
        }

        members.extend(alternatives);
    }

    SelectorList {
        members,
        line: list.line,
        filename: list.filename.clone(),
    }
}

/// Merge a matched compound into the extender's trailing compound.
///
/// The matched keys are removed from the compound; what remains (the
/// residue) is folded into the extender's final compound under CSS
/// composition rules: the element or universal selector leads, pseudo
/// selectors trail, and two different ID selectors (or two different
/// element names) make the pair ununifiable, in which case the entry is
/// skipped for this compound.
fn unify_with_extender(
    compound: &CompoundSelector,
    entry: &ExtensionEntry,
) -> Option<CompoundSelector> {
    let mut residue = compound.simple_selectors.clone();
    for key in &entry.target {
        let at = residue.iter().position(|simple| simple == key)?;
        let _ = residue.remove(at);
    }

    let extender_last = entry.extender.trailing_compound()?;
    let mut simples = extender_last.simple_selectors.clone();

    for simple in residue {
        if simples.contains(&simple) {
            continue;
        }
        match &simple {
            SimpleSelector::Element { .. } | SimpleSelector::Universal { .. } => {
                let leading_named = matches!(
                    simples.first(),
                    Some(SimpleSelector::Element { .. } | SimpleSelector::Universal { .. })
                );
                if leading_named {
                    if matches!(&simples[0], SimpleSelector::Universal { namespace: None }) {
                        simples[0] = simple;
                    } else if matches!(&simple, SimpleSelector::Universal { namespace: None }) {
                        // Subsumed by the more specific leading selector.
                    } else {
                        return None;
                    }
                } else {
                    simples.insert(0, simple);
                }
            }
            SimpleSelector::Id(_) => {
                if simples
                    .iter()
                    .any(|existing| matches!(existing, SimpleSelector::Id(_)) && *existing != simple)
                {
                    return None;
                }
                insert_before_pseudos(&mut simples, simple);
            }
            SimpleSelector::Pseudo { .. } => simples.push(simple),
            _ => insert_before_pseudos(&mut simples, simple),
        }
    }

    let mut unified = CompoundSelector::new(simples, compound.span);
    unified.important_hack = compound.important_hack || extender_last.important_hack;
    Some(unified)
}

/// Insert a simple selector before any trailing pseudo selectors.
fn insert_before_pseudos(simples: &mut Vec<SimpleSelector>, simple: SimpleSelector) {
    let at = simples
        .iter()
        .position(SimpleSelector::is_pseudo)
        .unwrap_or(simples.len());
    simples.insert(at, simple);
}

/// An error positioned at a selector list's source tag.
pub(crate) fn list_error(list: &SelectorList, message: impl Into<String>) -> SyntaxError {
    let err = SyntaxError::new(message, SourcePosition::new(list.line, 1, 0));
    match &list.filename {
        Some(filename) => err.with_filename(filename.clone()),
        None => err,
    }
}
