//! Parser for [`@at-root`](https://sass-lang.com/documentation/at-rules/at-root/)
//! queries.
//!
//! "The @at-root rule can be written `@at-root (with: <rules...>)` or
//! `@at-root (without: <rules...>)` to tell Sass which at-rules should be
//! included." The query grammar is fixed and tiny:
//!
//! ```text
//! query := '(' ('with' | 'without') ':' name+ ')'
//! ```

use moss_common::error::SyntaxError;
use moss_common::scanner::Scanner;
use serde::Serialize;
use strum_macros::Display;

/// Whether a query selects the named at-rules or everything but them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum AtRootQueryKind {
    /// `(with: ...)` - move the rule inside only the named at-rules.
    #[strum(serialize = "with")]
    With,
    /// `(without: ...)` - move the rule outside the named at-rules.
    #[strum(serialize = "without")]
    Without,
}

/// A parsed `@at-root` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtRootQuery {
    /// Inclusion or exclusion.
    pub kind: AtRootQueryKind,
    /// The at-rule names the query applies to, in source order.
    pub names: Vec<String>,
}

/// Parse an `@at-root` query.
///
/// # Errors
///
/// Returns a [`SyntaxError`] on any required-token mismatch or trailing
/// unparsed input.
pub fn parse_at_root_query(text: &str) -> Result<AtRootQuery, SyntaxError> {
    let mut scanner = Scanner::new(text);
    let _ = scanner.skip_whitespace();
    scanner.expect_char('(')?;
    let _ = scanner.skip_whitespace();

    let saved = scanner.state();
    let kind = match scanner.scan_ident().as_deref() {
        Some("with") => AtRootQueryKind::With,
        Some("without") => AtRootQueryKind::Without,
        _ => {
            scanner.restore(saved);
            return Err(scanner.expected("\"with\" or \"without\""));
        }
    };

    let _ = scanner.skip_whitespace();
    scanner.expect_char(':')?;
    let _ = scanner.skip_whitespace();

    let mut names = vec![scanner.expect_ident()?];
    loop {
        let _ = scanner.skip_whitespace();
        match scanner.scan_ident() {
            Some(name) => names.push(name),
            None => break,
        }
    }

    scanner.expect_char(')')?;
    let _ = scanner.skip_whitespace();
    if !scanner.is_done() {
        return Err(scanner.expected("end of query"));
    }
    Ok(AtRootQuery { kind, names })
}
