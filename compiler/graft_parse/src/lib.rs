//! Recursive descent parser for Graft.
//!
//! Produces a flat AST in an `ExprArena`. The parser's defining job is
//! disambiguation of generic-argument lists from comparison/shift
//! operators: in expression position a generic list is recognized only
//! after the two-token marker `::` `<`; everywhere else `<`, `>`, `<<`,
//! `>>` are ordinary operators at their usual precedence. A `>>` token is
//! split into two logical closers when two lists are open.

mod cursor;
mod error;
mod grammar;
mod recovery;

#[cfg(test)]
mod tests;

pub use cursor::Cursor;
pub use error::ParseError;
pub use recovery::synchronize;

use graft_ir::{
    ArenaMark, ExprArena, ExprId, Name, Span, StringInterner, Token, TokenKind, TokenList, Unit,
};

/// Parser state.
///
/// The flag fields steer context-sensitive corners of the grammar:
/// `generic_depth`/`pending_closers` drive generic-list closing (including
/// `>>` splitting), `no_angle` marks an unparenthesized const-generic
/// argument slot, `allow_let_cond` permits `let` clauses in a condition,
/// and `no_struct_lit` suppresses struct literals where `{` opens a block.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: ExprArena,
    generic_depth: u32,
    pending_closers: u8,
    no_angle: bool,
    allow_let_cond: bool,
    no_struct_lit: bool,
}

/// Rollback point for speculative parsing: cursor position, arena
/// high-water marks, and generic-list bookkeeping.
#[derive(Copy, Clone, Debug)]
pub struct ParseSnapshot {
    pos: usize,
    mark: ArenaMark,
    generic_depth: u32,
    pending_closers: u8,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenList, interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens, interner),
            arena: ExprArena::new(),
            generic_depth: 0,
            pending_closers: 0,
            no_angle: false,
            allow_let_cond: false,
            no_struct_lit: false,
        }
    }

    /// Record a rollback point before speculative parsing.
    pub(crate) fn snapshot(&self) -> ParseSnapshot {
        ParseSnapshot {
            pos: self.cursor.position(),
            mark: self.arena.mark(),
            generic_depth: self.generic_depth,
            pending_closers: self.pending_closers,
        }
    }

    /// Roll back to a snapshot, discarding speculative allocations.
    pub(crate) fn restore(&mut self, snapshot: ParseSnapshot) {
        self.cursor.set_position(snapshot.pos);
        self.arena.truncate(snapshot.mark);
        self.generic_depth = snapshot.generic_depth;
        self.pending_closers = snapshot.pending_closers;
    }

    // Cursor delegation.

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    pub(crate) fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.cursor.peek_kind()
    }

    #[inline]
    pub(crate) fn advance(&mut self) -> &Token {
        self.cursor.advance()
    }

    #[inline]
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    #[inline]
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<&Token, ParseError> {
        self.cursor.expect(kind)
    }

    #[inline]
    pub(crate) fn expect_ident(&mut self) -> Result<Name, ParseError> {
        self.cursor.expect_ident()
    }

    #[inline]
    pub(crate) fn arena_mut(&mut self) -> &mut ExprArena {
        &mut self.arena
    }

    #[inline]
    pub(crate) fn arena(&self) -> &ExprArena {
        &self.arena
    }

    /// Parse a whole compilation unit, recovering at declaration
    /// boundaries so several errors can be reported in one pass.
    pub fn parse_unit(mut self) -> ParseResult {
        let span = tracing::info_span!("parse_unit");
        let _enter = span.enter();

        let mut unit = Unit::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            match self.parse_decl() {
                Ok(decl) => unit.decls.push(decl),
                Err(err) => {
                    errors.push(err);
                    recovery::synchronize(&mut self.cursor);
                }
            }
        }

        tracing::debug!(decls = unit.decls.len(), errors = errors.len(), "unit parsed");
        ParseResult {
            unit,
            arena: self.arena,
            errors,
        }
    }
}

/// Result of parsing one compilation unit.
#[derive(Debug)]
pub struct ParseResult {
    pub unit: Unit,
    pub arena: ExprArena,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse a compilation unit from tokens.
pub fn parse_unit(tokens: &TokenList, interner: &StringInterner) -> ParseResult {
    Parser::new(tokens, interner).parse_unit()
}

/// Parse a standalone expression; the macro expander's re-entry point and
/// the contract surface for expression-level tests.
pub fn parse_expression(
    tokens: &TokenList,
    interner: &StringInterner,
) -> Result<(ExprId, ExprArena), ParseError> {
    let mut parser = Parser::new(tokens, interner);
    let expr = parser.parse_expr()?;
    if !parser.is_at_end() {
        return Err(ParseError::new(
            graft_diagnostic::ErrorCode::E1001,
            format!(
                "unexpected {} after expression",
                parser.current_kind().display_name()
            ),
            parser.current_span(),
        ));
    }
    Ok((expr, parser.arena))
}
