//! Script-value bridge.
//!
//! [Selector functions](https://sass-lang.com/documentation/modules/selector/)
//! in the expression sub-language see selectors "as a comma-separated list
//! (the selector list) that contains space-separated lists (the complex
//! selectors) that contain unquoted strings (the compound selectors)".
//! This module is the selector side of that contract.

use moss_common::value::Value;

use crate::ast::SelectorList;

impl SelectorList {
    /// Convert to the generic two-level list value: outer separator
    /// comma, inner separator space, each leaf the component's own
    /// rendered text (`.foo`, `#bar`, `[attr=val]`, `>`).
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::comma_list(
            self.members
                .iter()
                .map(|member| {
                    Value::space_list(
                        member
                            .components
                            .iter()
                            .map(ToString::to_string)
                            // Descendant combinators render as nothing and
                            // have no leaf of their own.
                            .filter(|text| !text.is_empty())
                            .map(Value::String)
                            .collect(),
                    )
                })
                .collect(),
        )
    }
}
