//! Character scanner with checkpointed backtracking.
//!
//! The selector grammar contains deliberate ambiguities (compound selector
//! boundaries, pseudo-class arguments) that are resolved by speculative
//! parsing: save the scanner state, attempt a sub-production, and restore
//! the state if the attempt fails. Backtracking is explicit save/restore of
//! a value-typed checkpoint - never unwinding control transfer - so a
//! failed alternative always leaves the scanner exactly where it started.
//!
//! The scanner tracks line and column as it advances, so any failure can
//! report an exact source location without a second pass over the input.

use crate::error::SyntaxError;
use crate::position::SourcePosition;

/// A saved scanner state.
///
/// Restoring a state rewinds the cursor and its line/column counters to the
/// moment the state was taken. States are plain values; taking one has no
/// side effect on the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerState {
    position: usize,
    line: u32,
    column: u32,
}

/// Position-tracked cursor over an immutable input span.
///
/// One scanner per parse job: the cursor state is inherently sequential and
/// must not be shared across concurrent invocations.
#[derive(Debug)]
pub struct Scanner {
    /// The input being scanned.
    input: Vec<char>,
    /// Current position in the input.
    position: usize,
    /// 1-based line of the current position.
    line: u32,
    /// 1-based column of the current position.
    column: u32,
    /// Character offset of the input's first character within its file.
    base_offset: usize,
    /// The file the input came from, if known.
    filename: Option<String>,
}

impl Scanner {
    /// Create a scanner over the given input, positioned at its start.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            base_offset: 0,
            filename: None,
        }
    }

    /// Attach the name of the file the input came from, for diagnostics.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set where in its file the input begins.
    ///
    /// Selector text is a span inside a larger stylesheet; diagnostics must
    /// report positions relative to the whole file, not the span.
    #[must_use]
    pub fn with_start(mut self, start: SourcePosition) -> Self {
        self.line = start.line;
        self.column = start.column;
        self.base_offset = start.offset;
        self
    }

    /// Whether the whole input has been consumed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.position >= self.input.len()
    }

    /// The next character, without advancing.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// The character `offset` places past the next one, without advancing.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Consume and return the next character, updating line/column.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// The current position, in file coordinates.
    #[must_use]
    pub const fn position(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
            offset: self.base_offset + self.position,
        }
    }

    /// The file being scanned, if known.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Take a checkpoint of the current state.
    #[must_use]
    pub const fn state(&self) -> ScannerState {
        ScannerState {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    /// Rewind to a previously taken checkpoint.
    pub fn restore(&mut self, state: ScannerState) {
        self.position = state.position;
        self.line = state.line;
        self.column = state.column;
    }

    /// The text consumed since `from` was taken.
    #[must_use]
    pub fn slice(&self, from: ScannerState) -> String {
        self.input[from.position..self.position].iter().collect()
    }

    /// Consume `expected` if it is the next character. Returns whether it
    /// was consumed.
    pub fn scan_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            let _ = self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `expected` if the input continues with it. Either the whole
    /// string is consumed or the scanner does not move.
    pub fn scan_str(&mut self, expected: &str) -> bool {
        for (i, c) in expected.chars().enumerate() {
            if self.peek_at(i) != Some(c) {
                return false;
            }
        }
        for _ in expected.chars() {
            let _ = self.advance();
        }
        true
    }

    /// Consume an identifier if one starts here.
    ///
    /// Identifiers follow the CSS rules: an optional leading `-`, then an
    /// ident-start character (letter, `_`, or non-ASCII), then ident
    /// characters (adding digits and `-`).
    pub fn scan_ident(&mut self) -> Option<String> {
        let first = self.peek()?;
        let starts = is_ident_start_char(first)
            || (first == '-' && self.peek_at(1).is_some_and(is_ident_start_char));
        if !starts {
            return None;
        }

        let mut ident = String::new();
        while self.peek().is_some_and(is_ident_char) {
            // advance() cannot fail here: peek() just returned a character.
            if let Some(c) = self.advance() {
                ident.push(c);
            }
        }
        Some(ident)
    }

    /// Consume a quoted string literal if one starts here, returning its
    /// raw text including the quotes.
    ///
    /// Backslash escapes are carried through verbatim. An unterminated
    /// string is not consumed at all.
    pub fn scan_string(&mut self) -> Option<String> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return None,
        };
        let saved = self.state();
        let mut literal = String::new();
        let _ = self.advance();
        literal.push(quote);

        while let Some(c) = self.advance() {
            literal.push(c);
            if c == quote {
                return Some(literal);
            }
            if c == '\\' {
                // Keep the escaped character with its backslash.
                if let Some(escaped) = self.advance() {
                    literal.push(escaped);
                }
            }
        }

        // Ran off the end without a closing quote.
        self.restore(saved);
        None
    }

    /// Consume a number (`12`, `2.5`) if one starts here, returning its
    /// raw text.
    pub fn scan_number(&mut self) -> Option<String> {
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        let saved = self.state();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let _ = self.advance();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            let _ = self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                let _ = self.advance();
            }
        }
        Some(self.slice(saved))
    }

    /// Skip whitespace and `/* ... */` comments.
    ///
    /// Returns whether a newline was crossed, which the parser turns into
    /// the formatting markers on selector components.
    pub fn skip_whitespace(&mut self) -> bool {
        let mut saw_newline = false;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    saw_newline |= c == '\n';
                    let _ = self.advance();
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let _ = self.advance();
                    let _ = self.advance();
                    while let Some(c) = self.advance() {
                        saw_newline |= c == '\n';
                        if c == '*' && self.peek() == Some('/') {
                            let _ = self.advance();
                            break;
                        }
                    }
                }
                _ => return saw_newline,
            }
        }
    }

    /// Consume `expected` or fail with an `expected "..."` error at the
    /// current position.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the next character is not `expected`.
    pub fn expect_char(&mut self, expected: char) -> Result<(), SyntaxError> {
        if self.scan_char(expected) {
            Ok(())
        } else {
            Err(self.expected(&format!("\"{expected}\"")))
        }
    }

    /// Consume an identifier or fail with an `expected identifier` error.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if no identifier starts here.
    pub fn expect_ident(&mut self) -> Result<String, SyntaxError> {
        self.scan_ident()
            .ok_or_else(|| self.expected("identifier"))
    }

    /// Build an `expected ...` error at the current position.
    #[must_use]
    pub fn expected(&self, what: &str) -> SyntaxError {
        self.error(format!("expected {what}"))
    }

    /// Build an error with an arbitrary message at the current position.
    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> SyntaxError {
        let err = SyntaxError::new(message, self.position());
        match &self.filename {
            Some(name) => err.with_filename(name.clone()),
            None => err,
        }
    }

    /// Run a sub-production, restoring the scanner on failure.
    ///
    /// On success the consumed input stays consumed; on failure the scanner
    /// is rewound to where it was and the sub-production's first diagnostic
    /// is handed back to the caller, who decides whether to surface it or
    /// try another alternative.
    ///
    /// # Errors
    ///
    /// Propagates the sub-production's error after restoring position.
    pub fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        let saved = self.state();
        let result = f(self);
        if result.is_err() {
            self.restore(saved);
        }
        result
    }

    /// Run a sub-production and also return the text it consumed.
    ///
    /// # Errors
    ///
    /// Propagates the sub-production's error; the consumed input is not
    /// restored (wrap in [`Scanner::attempt`] for backtracking).
    pub fn capture<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<(T, String), SyntaxError> {
        let saved = self.state();
        let value = f(self)?;
        Ok((value, self.slice(saved)))
    }
}

/// Whether a character can start an identifier.
#[must_use]
pub const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Whether a character can continue an identifier.
#[must_use]
pub const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}
