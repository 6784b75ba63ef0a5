//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption; the
//! grammar modules build on these primitives.

use crate::ParseError;
use graft_diagnostic::ErrorCode;
use graft_ir::{Name, Span, StringInterner, Token, TokenKind, TokenList};

/// Cursor over a lexed token stream.
///
/// Invariant: the stream ends with `Eof`, so the current position is always
/// valid and `advance` never runs off the end as long as callers check the
/// current token first.
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    interner: &'a StringInterner,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList, interner: &'a StringInterner) -> Self {
        debug_assert!(!tokens.is_empty(), "token list must end with Eof");
        Cursor {
            tokens,
            interner,
            pos: 0,
        }
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    /// Current position, for snapshots and progress checks.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Restore a previously recorded position.
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos <= self.tokens.len());
        self.pos = pos;
    }

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    #[inline]
    pub fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// One-token lookahead; `Eof` past the end.
    pub fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    /// Advance past the current token and return it.
    #[inline]
    pub fn advance(&mut self) -> &Token {
        let current = self.pos;
        debug_assert!(self.pos + 1 < self.tokens.len() || self.is_at_end());
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[current]
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect the current token to be `kind`, advance past it.
    #[inline]
    pub fn expect(&mut self, kind: TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.make_expect_error(kind))
        }
    }

    /// Error path of `expect`, kept out of line so the happy path inlines.
    #[cold]
    #[inline(never)]
    fn make_expect_error(&self, kind: TokenKind) -> ParseError {
        ParseError::new(
            ErrorCode::E1001,
            format!(
                "expected {}, found {}",
                kind.display_name(),
                self.current_kind().display_name()
            ),
            self.current_span(),
        )
        .with_context(format!("expected {}", kind.display_name()))
    }

    /// Expect and consume an identifier, returning its interned name.
    #[inline]
    pub fn expect_ident(&mut self) -> Result<Name, ParseError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            self.advance();
            Ok(name)
        } else {
            Err(self.make_expect_ident_error())
        }
    }

    #[cold]
    #[inline(never)]
    fn make_expect_ident_error(&self) -> ParseError {
        ParseError::new(
            ErrorCode::E1004,
            format!(
                "expected identifier, found {}",
                self.current_kind().display_name()
            ),
            self.current_span(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_lexer::lex;

    fn cursor_over(source: &'static str) -> (&'static TokenList, &'static StringInterner) {
        let interner = Box::leak(Box::new(StringInterner::new()));
        let out = lex(source, interner);
        assert!(!out.has_errors());
        (Box::leak(Box::new(out.tokens)), interner)
    }

    #[test]
    fn test_navigation() {
        let (tokens, interner) = cursor_over("let x = 42");
        let mut cursor = Cursor::new(tokens, interner);

        assert!(cursor.check(TokenKind::Let));
        cursor.advance();
        assert!(cursor.check_ident());
        cursor.advance();
        assert!(cursor.check(TokenKind::Eq));
        cursor.advance();
        assert!(matches!(cursor.current_kind(), TokenKind::Int(42)));
        cursor.advance();
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_advance_stops_at_eof() {
        let (tokens, interner) = cursor_over("x");
        let mut cursor = Cursor::new(tokens, interner);
        cursor.advance();
        cursor.advance();
        cursor.advance();
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_expect_failure() {
        let (tokens, interner) = cursor_over("let");
        let mut cursor = Cursor::new(tokens, interner);
        let err = cursor.expect(TokenKind::If).unwrap_err();
        assert_eq!(err.code, ErrorCode::E1001);
    }

    #[test]
    fn test_peek() {
        let (tokens, interner) = cursor_over(":: <");
        let cursor = Cursor::new(tokens, interner);
        assert!(cursor.check(TokenKind::PathSep));
        assert_eq!(cursor.peek_kind(), TokenKind::Lt);
    }
}
