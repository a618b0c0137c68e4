//! Recursive-descent selector parser.
//!
//! The grammar is mostly LL(1) but has two deliberate ambiguities that are
//! resolved by backtracking over scanner checkpoints:
//!
//! - **Compound boundaries.** After a compound selector's trailing
//!   components are collected, a second compound starting with no
//!   intervening whitespace (`.foo&`, `div.bar&x`) is a grammar error, not
//!   a new compound. The parser re-parses speculatively and reports the
//!   offending fragment.
//! - **Pseudo arguments.** `:nth-child(2n+1)` takes an expression;
//!   `:not(.foo, .bar)` takes a selector list. The expression grammar is
//!   tried first and accepted only when it ends at `,` or `)`; otherwise
//!   the scanner rewinds and a nested selector list is parsed. If both
//!   fail, the expression's diagnostic wins - exotic numeric arguments are
//!   the more common user intent than malformed nested selectors.
//!
//! Whitespace between components is insignificant except that it implies
//! the descendant combinator, and newlines are tracked as formatting
//! markers on the following component.

use moss_common::error::SyntaxError;
use moss_common::position::{SourcePosition, Span};
use moss_common::scanner::{Scanner, is_ident_start_char};
use moss_common::warning::warn_once;

use crate::ast::{
    AttributeOp, Combinator, ComplexSelector, ComponentKind, CompoundSelector, NamespacePrefix,
    PseudoKind, SelectorComponent, SelectorList, SimpleSelector,
};

/// The expression sub-language collaborator.
///
/// Interpolation (`#{...}`) belongs to the expression sub-language, a
/// separate component. The selector parser receives the collaborator at
/// construction and delegates when it meets `#{` inside a pseudo
/// expression; without one, interpolation is a syntax error.
pub trait InterpolationParser {
    /// Consume one interpolation from the scanner, which is positioned at
    /// the leading `#{`, through its closing `}`, and return the
    /// replacement text.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the interpolated expression is
    /// malformed.
    fn parse_interpolation(&self, scanner: &mut Scanner) -> Result<String, SyntaxError>;
}

/// Parse a selector list from a text span.
///
/// `position` is where the span starts in its file, so diagnostics point
/// into the whole stylesheet; `allow_parent_ref` enables `&` and is true
/// only inside nested-rule bodies.
///
/// # Errors
///
/// Returns a [`SyntaxError`] on any required-token mismatch, trailing
/// unparsed input, or the compound-boundary ambiguity.
pub fn parse_selector(
    text: &str,
    filename: Option<&str>,
    position: SourcePosition,
    allow_parent_ref: bool,
) -> Result<SelectorList, SyntaxError> {
    let mut parser = SelectorParser::new(text)
        .with_start(position)
        .allow_parent_ref(allow_parent_ref);
    if let Some(filename) = filename {
        parser = parser.with_filename(filename);
    }
    parser.parse()
}

/// Backtracking recursive-descent parser over one selector span.
///
/// One parser per parse job: the scanner state is sequential and must not
/// be shared across concurrent invocations.
pub struct SelectorParser<'a> {
    scanner: Scanner,
    allow_parent_ref: bool,
    interpolation: Option<&'a dyn InterpolationParser>,
}

impl<'a> SelectorParser<'a> {
    /// Create a parser over the given selector text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            scanner: Scanner::new(text),
            allow_parent_ref: false,
            interpolation: None,
        }
    }

    /// Attach the name of the file being parsed, for diagnostics.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.scanner = self.scanner.with_filename(filename);
        self
    }

    /// Set where in its file the selector text begins.
    #[must_use]
    pub fn with_start(mut self, start: SourcePosition) -> Self {
        self.scanner = self.scanner.with_start(start);
        self
    }

    /// Enable or disable parent-reference syntax (`&`). Enabled only
    /// inside nested-rule bodies.
    #[must_use]
    pub const fn allow_parent_ref(mut self, allow: bool) -> Self {
        self.allow_parent_ref = allow;
        self
    }

    /// Inject the expression sub-language collaborator used for
    /// interpolation inside pseudo expressions.
    #[must_use]
    pub const fn with_interpolation(mut self, parser: &'a dyn InterpolationParser) -> Self {
        self.interpolation = Some(parser);
        self
    }

    /// Parse the whole span as a selector list.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] on any required-token mismatch or if the
    /// span is not fully consumed.
    pub fn parse(&mut self) -> Result<SelectorList, SyntaxError> {
        let line = self.scanner.position().line;
        let filename = self.scanner.filename().map(str::to_owned);

        let _ = self.scanner.skip_whitespace();
        let mut members = vec![self.parse_complex(false)?];
        while self.scanner.scan_char(',') {
            // A newline after the comma tags the next member so formatted
            // output can reproduce multi-line selector lists.
            let newline = self.scanner.skip_whitespace();
            members.push(self.parse_complex(newline)?);
        }

        if !self.scanner.is_done() {
            return Err(self.scanner.expected("selector"));
        }
        Ok(SelectorList::new(members).with_source(line, filename))
    }

    /// `selector := (combinator | compound)+`
    ///
    /// The trailing whitespace before a `,` or the end of input is
    /// consumed here; the member ends at the first character that can
    /// start neither a combinator nor a compound.
    fn parse_complex(&mut self, preceded_by_newline: bool) -> Result<ComplexSelector, SyntaxError> {
        let mut components: Vec<SelectorComponent> = Vec::new();
        let mut pending_newline = preceded_by_newline;

        loop {
            let before = self.scanner.state();
            let skipped_newline = self.scanner.skip_whitespace();
            let newline = pending_newline || skipped_newline;
            let ws_before = self.scanner.state() != before;
            pending_newline = false;

            if let Some(combinator) = self.scan_combinator()? {
                components.push(SelectorComponent {
                    kind: ComponentKind::Combinator(combinator),
                    preceded_by_newline: newline,
                });
                continue;
            }

            if !self.can_start_compound() {
                break;
            }

            // Whitespace between two compounds is the descendant
            // combinator.
            if ws_before
                && components
                    .last()
                    .is_some_and(SelectorComponent::is_compound)
            {
                components.push(SelectorComponent {
                    kind: ComponentKind::Combinator(Combinator::Descendant),
                    preceded_by_newline: newline,
                });
                let compound = self.parse_compound()?;
                components.push(SelectorComponent::compound(compound));
            } else {
                let compound = self.parse_compound()?;
                components.push(SelectorComponent {
                    kind: ComponentKind::Compound(compound),
                    preceded_by_newline: newline,
                });
            }
        }

        if components.is_empty() {
            return Err(self.scanner.expected("selector"));
        }
        Ok(ComplexSelector::new(components))
    }

    /// `combinator := '+' | '>' | '~' | reference-combinator`
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if a reference combinator starts but is
    /// malformed.
    fn scan_combinator(&mut self) -> Result<Option<Combinator>, SyntaxError> {
        if self.scanner.scan_char('+') {
            return Ok(Some(Combinator::AdjacentSibling));
        }
        if self.scanner.scan_char('>') {
            return Ok(Some(Combinator::Child));
        }
        if self.scanner.scan_char('~') {
            return Ok(Some(Combinator::GeneralSibling));
        }
        if self.scanner.peek() == Some('/') {
            // `/* ... */` comments were already consumed with whitespace,
            // so a `/` here starts `/name/` or `/ns|name/`.
            let _ = self.scanner.advance();
            let first = self.scanner.expect_ident()?;
            let (namespace, name) = if self.scanner.scan_char('|') {
                (
                    Some(NamespacePrefix::Named(first)),
                    self.scanner.expect_ident()?,
                )
            } else {
                (None, first)
            };
            self.scanner.expect_char('/')?;
            warn_once(
                "Selector",
                "the reference combinator \"/name/\" is nonstandard and was dropped from Selectors Level 4",
            );
            return Ok(Some(Combinator::Reference { namespace, name }));
        }
        Ok(None)
    }

    /// Whether the next character can start a compound selector.
    fn can_start_compound(&self) -> bool {
        match self.scanner.peek() {
            Some('.' | '#' | '%' | '[' | ':' | '*' | '|') => true,
            Some('&') => self.allow_parent_ref,
            Some('-') => self.scanner.peek_at(1).is_some_and(is_ident_start_char),
            Some(c) => is_ident_start_char(c),
            None => false,
        }
    }

    /// `compound := first-simple (id | class | placeholder | attribute |
    /// pseudo | '*')* '!'?`
    ///
    /// After everything consumable is consumed, a speculative re-parse
    /// decides whether what follows is a second compound jammed against
    /// this one - a grammar error.
    fn parse_compound(&mut self) -> Result<CompoundSelector, SyntaxError> {
        let start = self.scanner.position().offset;
        let mut simple_selectors = vec![self.parse_first_simple()?];
        let mut important_hack = false;

        loop {
            match self.scanner.peek() {
                Some('.') => {
                    let _ = self.scanner.advance();
                    simple_selectors.push(SimpleSelector::Class(self.scanner.expect_ident()?));
                }
                Some('#') => {
                    let _ = self.scanner.advance();
                    simple_selectors.push(SimpleSelector::Id(self.scanner.expect_ident()?));
                }
                Some('%') => {
                    let _ = self.scanner.advance();
                    simple_selectors
                        .push(SimpleSelector::Placeholder(self.scanner.expect_ident()?));
                }
                Some('[') => simple_selectors.push(self.parse_attribute()?),
                Some(':') => simple_selectors.push(self.parse_pseudo()?),
                // A repeated `*` is accepted as a compatibility form and
                // yields a bare universal selector.
                Some('*') => {
                    let _ = self.scanner.advance();
                    simple_selectors.push(SimpleSelector::Universal { namespace: None });
                }
                Some('!') => {
                    let _ = self.scanner.advance();
                    important_hack = true;
                }
                _ => break,
            }
        }

        let span = Span::new(start, self.scanner.position().offset);

        // Speculative re-parse: if another compound starts right here with
        // no whitespace, the input is ambiguous and we report the fragment
        // rather than silently gluing selectors together.
        if self.can_start_compound() {
            let saved = self.scanner.state();
            let speculative = self.parse_compound();
            if speculative.is_ok() {
                let fragment = self.scanner.slice(saved);
                self.scanner.restore(saved);
                let bare_universal = simple_selectors.len() == 1
                    && matches!(
                        simple_selectors[0],
                        SimpleSelector::Universal { namespace: None }
                    );
                // A lone `*` followed by more input is the legacy
                // property-hack syntax, handled by the declaration parser;
                // here it just fails like any missing block would.
                return Err(if bare_universal {
                    self.scanner.expected("\"{\"")
                } else {
                    self.scanner.error(format!(
                        "\"{fragment}\" may only be used at the beginning of a compound selector"
                    ))
                });
            }
            self.scanner.restore(saved);
        }

        let mut compound = CompoundSelector::new(simple_selectors, span);
        compound.important_hack = important_hack;
        Ok(compound)
    }

    /// The first simple selector of a compound, which unlike the trailing
    /// positions may be an element name, a universal selector, or a
    /// parent reference.
    fn parse_first_simple(&mut self) -> Result<SimpleSelector, SyntaxError> {
        match self.scanner.peek() {
            Some('.') => {
                let _ = self.scanner.advance();
                Ok(SimpleSelector::Class(self.scanner.expect_ident()?))
            }
            Some('#') => {
                let _ = self.scanner.advance();
                Ok(SimpleSelector::Id(self.scanner.expect_ident()?))
            }
            Some('%') => {
                let _ = self.scanner.advance();
                Ok(SimpleSelector::Placeholder(self.scanner.expect_ident()?))
            }
            Some('[') => self.parse_attribute(),
            Some(':') => self.parse_pseudo(),
            Some('&') if self.allow_parent_ref => {
                let _ = self.scanner.advance();
                // An identifier jammed against the `&` is a suffix spliced
                // onto the parent: `&-sidebar`.
                let suffix = self.scanner.scan_ident();
                Ok(SimpleSelector::ParentRef { suffix })
            }
            _ => self.parse_qualified_start(),
        }
    }

    /// `element-name := qualified-name` where the name part may be `*`.
    ///
    /// Covers `name`, `*`, `ns|name`, `*|name`, `|name` and the `*`
    /// variants of each namespace form.
    fn parse_qualified_start(&mut self) -> Result<SimpleSelector, SyntaxError> {
        if self.scanner.scan_char('|') {
            return self.parse_qualified_name_part(Some(NamespacePrefix::Empty));
        }
        if self.scanner.scan_char('*') {
            if self.scanner.scan_char('|') {
                return self.parse_qualified_name_part(Some(NamespacePrefix::Any));
            }
            return Ok(SimpleSelector::Universal { namespace: None });
        }
        let name = self.scanner.expect_ident()?;
        if self.scanner.peek() == Some('|') && self.scanner.peek_at(1) != Some('=') {
            let _ = self.scanner.advance();
            return self.parse_qualified_name_part(Some(NamespacePrefix::Named(name)));
        }
        Ok(SimpleSelector::Element {
            name,
            namespace: None,
        })
    }

    /// The name after a namespace prefix: `*` or an identifier.
    fn parse_qualified_name_part(
        &mut self,
        namespace: Option<NamespacePrefix>,
    ) -> Result<SimpleSelector, SyntaxError> {
        if self.scanner.scan_char('*') {
            return Ok(SimpleSelector::Universal { namespace });
        }
        let name = self.scanner.expect_ident()?;
        Ok(SimpleSelector::Element { name, namespace })
    }

    /// `attribute := '[' ws qualified-attr-name ws (op ws (ident|string)
    /// ws)? flags? ']'`
    fn parse_attribute(&mut self) -> Result<SimpleSelector, SyntaxError> {
        let _ = self.scanner.advance(); // '['
        let _ = self.scanner.skip_whitespace();
        let (namespace, name) = self.parse_attribute_name()?;
        let _ = self.scanner.skip_whitespace();

        let op = self.scan_attribute_op();
        let mut value = None;
        if op.is_some() {
            let _ = self.scanner.skip_whitespace();
            let literal = match self.scanner.scan_string() {
                Some(literal) => literal,
                None => self
                    .scanner
                    .scan_ident()
                    .ok_or_else(|| self.scanner.expected("identifier or string"))?,
            };
            value = Some(literal);
            let _ = self.scanner.skip_whitespace();
        }

        // An optional trailing token such as the `i` case-insensitivity
        // flag.
        let flags = match self.scanner.scan_string() {
            Some(literal) => Some(literal),
            None => self.scanner.scan_ident(),
        };
        let _ = self.scanner.skip_whitespace();
        self.scanner.expect_char(']')?;

        Ok(SimpleSelector::Attribute {
            name,
            namespace,
            op,
            value,
            flags,
        })
    }

    /// The attribute name with its optional namespace prefix. `|` binds to
    /// the namespace only when not part of the `|=` operator.
    fn parse_attribute_name(
        &mut self,
    ) -> Result<(Option<NamespacePrefix>, String), SyntaxError> {
        if self.scanner.scan_char('|') {
            return Ok((Some(NamespacePrefix::Empty), self.scanner.expect_ident()?));
        }
        if self.scanner.scan_char('*') {
            self.scanner.expect_char('|')?;
            return Ok((Some(NamespacePrefix::Any), self.scanner.expect_ident()?));
        }
        let first = self.scanner.expect_ident()?;
        if self.scanner.peek() == Some('|') && self.scanner.peek_at(1) != Some('=') {
            let _ = self.scanner.advance();
            return Ok((
                Some(NamespacePrefix::Named(first)),
                self.scanner.expect_ident()?,
            ));
        }
        Ok((None, first))
    }

    /// `operator := '=' | '~=' | '|=' | '^=' | '$=' | '*='`
    fn scan_attribute_op(&mut self) -> Option<AttributeOp> {
        match self.scanner.peek() {
            Some('=') => {
                let _ = self.scanner.advance();
                Some(AttributeOp::Equals)
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) if self.scanner.peek_at(1) == Some('=') => {
                let _ = self.scanner.advance();
                let _ = self.scanner.advance();
                Some(match c {
                    '~' => AttributeOp::Includes,
                    '|' => AttributeOp::DashMatch,
                    '^' => AttributeOp::PrefixMatch,
                    '$' => AttributeOp::SuffixMatch,
                    _ => AttributeOp::SubstringMatch,
                })
            }
            _ => None,
        }
    }

    /// `pseudo := (':' | '::') identifier ('(' argument (',' argument)*
    /// ')')?`
    fn parse_pseudo(&mut self) -> Result<SimpleSelector, SyntaxError> {
        let _ = self.scanner.advance(); // ':'
        let kind = if self.scanner.scan_char(':') {
            PseudoKind::Element
        } else {
            PseudoKind::Class
        };
        let name = self.scanner.expect_ident()?;

        let mut argument = None;
        if self.scanner.scan_char('(') {
            let mut args = vec![self.parse_pseudo_argument()?];
            loop {
                let _ = self.scanner.skip_whitespace();
                if !self.scanner.scan_char(',') {
                    break;
                }
                args.push(self.parse_pseudo_argument()?);
            }
            let _ = self.scanner.skip_whitespace();
            self.scanner.expect_char(')')?;
            argument = Some(args.join(", "));
        }

        Ok(SimpleSelector::Pseudo {
            kind,
            name,
            argument,
        })
    }

    /// One pseudo argument: a pseudo expression, or failing that, a
    /// nested selector list rendered back to text.
    fn parse_pseudo_argument(&mut self) -> Result<String, SyntaxError> {
        let saved = self.scanner.state();
        let expression_err = match self.parse_pseudo_expression() {
            Ok(text) => return Ok(text),
            Err(err) => err,
        };

        self.scanner.restore(saved);
        match self.parse_selector_argument() {
            Ok(text) => Ok(text),
            Err(_) => {
                // Both alternatives failed; the expression diagnostic is
                // the more informative default.
                self.scanner.restore(saved);
                Err(expression_err)
            }
        }
    }

    /// `pseudo-expression := token+` over `+ - *`, numbers, strings,
    /// identifiers, and interpolation, accepted only when it stops at `,`
    /// or `)`.
    fn parse_pseudo_expression(&mut self) -> Result<String, SyntaxError> {
        let _ = self.scanner.skip_whitespace();
        let mut text = String::new();
        let mut ws_before_token = false;

        while let Some(token) = self.scan_expression_token()? {
            if !text.is_empty() && ws_before_token {
                text.push(' ');
            }
            text.push_str(&token);

            let before = self.scanner.state();
            let _ = self.scanner.skip_whitespace();
            ws_before_token = self.scanner.state() != before;
        }

        if text.is_empty() {
            return Err(self.scanner.expected("expression"));
        }
        match self.scanner.peek() {
            Some(',' | ')') => Ok(text),
            _ => Err(self.scanner.expected("\")\"")),
        }
    }

    /// One pseudo-expression token, or `None` when no token starts here.
    fn scan_expression_token(&mut self) -> Result<Option<String>, SyntaxError> {
        match self.scanner.peek() {
            Some(c @ ('+' | '-' | '*')) => {
                let _ = self.scanner.advance();
                Ok(Some(c.to_string()))
            }
            Some('#') if self.scanner.peek_at(1) == Some('{') => match self.interpolation {
                Some(parser) => parser.parse_interpolation(&mut self.scanner).map(Some),
                None => Err(self.scanner.error("interpolation is not supported here")),
            },
            Some(c) if c.is_ascii_digit() => Ok(self.scanner.scan_number()),
            Some('"' | '\'') => Ok(self.scanner.scan_string()),
            Some(c) if is_ident_start_char(c) => Ok(self.scanner.scan_ident()),
            _ => Ok(None),
        }
    }

    /// A nested selector list inside pseudo parentheses, rendered back to
    /// its own text. The closing `)` is left for the caller.
    fn parse_selector_argument(&mut self) -> Result<String, SyntaxError> {
        let _ = self.scanner.skip_whitespace();
        let mut members = vec![self.parse_complex(false)?];
        while self.scanner.scan_char(',') {
            let newline = self.scanner.skip_whitespace();
            members.push(self.parse_complex(newline)?);
        }
        if self.scanner.peek() != Some(')') {
            return Err(self.scanner.expected("\")\""));
        }
        Ok(SelectorList::new(members).to_string())
    }
}
