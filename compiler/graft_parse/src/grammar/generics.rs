//! Generic-argument list parsing and angle-bracket disambiguation.
//!
//! A generic-argument list in expression position is introduced only by
//! the marker sequence `::` `<`; in type position a bare `<` after a named
//! type suffices (no operator can occur there). Arguments are types or
//! const expressions. Because the lexer produces `>>` as a single shift
//! token, closing a list must split it: with two lists open, one `>>`
//! closes both.
//!
//! Const-expression arguments are parsed with the `no_angle` restriction:
//! a top-level `<`, `<=`, `>=`, or `<<` is `AmbiguousConstGeneric`, and a
//! top-level `>` or `>>` ends the argument (it is a closer). Parentheses
//! lift the restriction, which is how `(A > (B))` stays legal.

use crate::{ParseError, Parser};
use graft_diagnostic::ErrorCode;
use graft_ir::{ExprId, ParsedTypeArg, Span, TokenKind};

impl Parser<'_> {
    /// Parse `<arg, arg, ...>` with the cursor on `<`.
    ///
    /// Shared by expression position (after the `::` marker has been
    /// consumed) and type position (bare `<`).
    pub(crate) fn parse_generic_arg_list(&mut self) -> Result<Vec<ParsedTypeArg>, ParseError> {
        self.expect(TokenKind::Lt)?;
        self.generic_depth += 1;

        let mut args = Vec::new();
        if !self.at_generic_closer() {
            loop {
                args.push(self.parse_generic_arg()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
                // Tolerate a trailing comma before the closer.
                if self.at_generic_closer() {
                    break;
                }
            }
        }

        self.eat_generic_closer()?;
        self.generic_depth -= 1;
        Ok(args)
    }

    /// Whether the current position closes a generic argument list:
    /// a banked closer from a split `>>`, a `>`, or a `>>`.
    pub(crate) fn at_generic_closer(&self) -> bool {
        self.pending_closers > 0 || self.check(TokenKind::Gt) || self.check(TokenKind::Shr)
    }

    /// Consume one list closer, splitting `>>` into two logical closers
    /// when two lists are open.
    pub(crate) fn eat_generic_closer(&mut self) -> Result<(), ParseError> {
        if self.pending_closers > 0 {
            self.pending_closers -= 1;
            return Ok(());
        }
        match self.current_kind() {
            TokenKind::Gt => {
                self.advance();
                Ok(())
            }
            TokenKind::Shr => {
                if self.generic_depth >= 2 {
                    // One token, two closers: consume it and bank the
                    // second half for the enclosing list.
                    self.advance();
                    self.pending_closers += 1;
                    Ok(())
                } else {
                    Err(ParseError::new(
                        ErrorCode::E1101,
                        "`>>` closes two generic argument lists, but only one is open",
                        self.current_span(),
                    ))
                }
            }
            TokenKind::Eof => Err(ParseError::new(
                ErrorCode::E1101,
                "end of input with a generic argument list still open",
                self.current_span(),
            )),
            other => Err(ParseError::new(
                ErrorCode::E1001,
                format!(
                    "expected `,` or `>` in generic argument list, found {}",
                    other.display_name()
                ),
                self.current_span(),
            )),
        }
    }

    /// One generic argument: a type, or failing that, a const expression.
    ///
    /// Speculative: try the type grammar first and accept it only when the
    /// argument ends at a `,` or a closer; otherwise roll back and parse a
    /// restricted const expression.
    fn parse_generic_arg(&mut self) -> Result<ParsedTypeArg, ParseError> {
        let snapshot = self.snapshot();
        if let Ok(ty) = self.parse_type() {
            if self.check(TokenKind::Comma) || self.at_generic_closer() {
                return Ok(ParsedTypeArg::Type(ty));
            }
        }
        self.restore(snapshot);

        let expr = self.parse_const_generic_expr()?;
        Ok(ParsedTypeArg::Const(expr))
    }

    /// Parse a const-generic argument with the angle restriction active.
    pub(crate) fn parse_const_generic_expr(&mut self) -> Result<ExprId, ParseError> {
        let saved = self.no_angle;
        self.no_angle = true;
        let result = self.parse_expr();
        self.no_angle = saved;
        result
    }

    /// The `AmbiguousConstGeneric` rejection for a bare comparison/shift
    /// operator in const-argument position.
    pub(crate) fn ambiguous_const_generic(&self, span: Span) -> ParseError {
        ParseError::new(
            ErrorCode::E1102,
            "comparison or shift operator in a const-generic argument must be fully parenthesized",
            span,
        )
    }
}
