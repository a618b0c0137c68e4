//! Parent-reference resolution.
//!
//! [Parent selector](https://sass-lang.com/documentation/style-rules/parent-selector/)
//! "When a rule is nested inside another rule, the inner rule's selector
//! is resolved relative to the outer rule's." The `&` placeholder stands
//! for the enclosing rule's already-resolved selector list; with no `&`
//! the parent is implicitly prefixed as an ancestor.

use moss_common::error::SyntaxError;

use super::list_error;
use crate::ast::{
    Combinator, ComplexSelector, ComponentKind, CompoundSelector, SelectorComponent, SelectorList,
    SimpleSelector,
};

/// Resolve every parent reference in `list` against `super_list`, the
/// enclosing rule's resolved selector list.
///
/// With no enclosing rule (`super_list` is `None`) the list must not
/// contain any parent reference; it is returned unchanged. Otherwise each
/// member expands to the cross product of substitutions across the super
/// list's members, super-member order outer, flattened into one ordered
/// sequence. When `implicit_parent` is set, a member with no parent
/// reference is prefixed with each super member as a descendant ancestor.
///
/// # Errors
///
/// Returns a [`SyntaxError`] for a parent reference at the document root,
/// or for a parent selector a `&` suffix cannot be appended to.
pub fn resolve_parent_refs(
    list: &SelectorList,
    super_list: Option<&SelectorList>,
    implicit_parent: bool,
) -> Result<SelectorList, SyntaxError> {
    let Some(super_list) = super_list else {
        if list.contains_parent_ref() {
            return Err(list_error(
                list,
                "base-level rules cannot contain the parent-selector-referencing character \"&\"",
            ));
        }
        return Ok(list.clone());
    };

    let mut members = Vec::new();
    for member in &list.members {
        if !member.contains_parent_ref() {
            if implicit_parent {
                for parent in &super_list.members {
                    let mut components = parent.components.clone();
                    components.push(SelectorComponent::combinator(Combinator::Descendant));
                    components.extend(member.components.iter().cloned());
                    members.push(ComplexSelector::new(components));
                }
            } else {
                members.push(member.clone());
            }
            continue;
        }

        // Each parent-referencing compound picks every super member in
        // turn, so a member with several references expands to the full
        // cross product.
        let mut variants: Vec<Vec<SelectorComponent>> = vec![Vec::new()];
        for component in &member.components {
            match &component.kind {
                ComponentKind::Compound(compound) if compound.contains_parent_ref() => {
                    let mut expanded = Vec::new();
                    for variant in &variants {
                        for parent in &super_list.members {
                            let substituted = substitute_parent(compound, parent, list)?;
                            let mut next = variant.clone();
                            next.extend(substituted);
                            expanded.push(next);
                        }
                    }
                    variants = expanded;
                }
                _ => {
                    for variant in &mut variants {
                        variant.push(component.clone());
                    }
                }
            }
        }
        members.extend(variants.into_iter().map(ComplexSelector::new));
    }

    Ok(SelectorList {
        members,
        line: list.line,
        filename: list.filename.clone(),
    })
}

/// Substitute one parent-referencing compound with the content of one
/// super-list member.
///
/// A bare `&` takes the parent's components verbatim. Anything fused to
/// the `&` - a suffix or further simple selectors - merges into the
/// parent's final compound, which must therefore exist: a parent ending
/// in a combinator can carry a nested `& x` but not a `&-suffix`.
fn substitute_parent(
    compound: &CompoundSelector,
    parent: &ComplexSelector,
    list: &SelectorList,
) -> Result<Vec<SelectorComponent>, SyntaxError> {
    let Some(at) = compound
        .simple_selectors
        .iter()
        .position(SimpleSelector::is_parent_ref)
    else {
        // The caller only passes compounds that contain a reference.
        return Ok(vec![SelectorComponent::compound(compound.clone())]);
    };
    if compound.simple_selectors[at + 1..]
        .iter()
        .any(SimpleSelector::is_parent_ref)
    {
        return Err(list_error(list, "invalid parent selector"));
    }

    let suffix = match &compound.simple_selectors[at] {
        SimpleSelector::ParentRef { suffix } => suffix.clone(),
        _ => None,
    };
    let before = &compound.simple_selectors[..at];
    let after = &compound.simple_selectors[at + 1..];

    if before.is_empty() && after.is_empty() && suffix.is_none() {
        return Ok(parent.components.clone());
    }

    let Some((last_component, lead)) = parent.components.split_last() else {
        return Err(list_error(list, "invalid parent selector"));
    };
    let ComponentKind::Compound(parent_last) = &last_component.kind else {
        return Err(list_error(
            list,
            format!("invalid parent selector \"{parent}\""),
        ));
    };

    let mut simples = parent_last.simple_selectors.clone();
    if let Some(suffix) = suffix {
        let Some(last_simple) = simples.pop() else {
            return Err(list_error(list, "invalid parent selector"));
        };
        let suffixed = last_simple.with_suffix(&suffix).ok_or_else(|| {
            list_error(list, format!("invalid parent selector \"{parent}\""))
        })?;
        simples.push(suffixed);
    }

    let mut merged_simples = before.to_vec();
    merged_simples.extend(simples);
    merged_simples.extend(after.iter().cloned());

    let mut merged = CompoundSelector::new(merged_simples, compound.span);
    merged.important_hack = compound.important_hack || parent_last.important_hack;

    let mut result: Vec<SelectorComponent> = lead.to_vec();
    result.push(SelectorComponent::compound(merged));
    Ok(result)
}
