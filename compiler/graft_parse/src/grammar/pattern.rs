//! Pattern parsing.

use crate::{ParseError, Parser};
use graft_diagnostic::ErrorCode;
use graft_ir::{Expr, ExprId, ExprKind, Pattern, PatternId, PatternKind, Span, TokenKind};

impl Parser<'_> {
    /// Parse a match/binding pattern.
    pub(crate) fn parse_pattern(&mut self) -> Result<PatternId, ParseError> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Underscore => {
                self.advance();
                PatternKind::Wildcard
            }

            TokenKind::Mut => {
                self.advance();
                let name = self.expect_ident()?;
                let ty = if self.eat(TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                PatternKind::Binding {
                    name,
                    ty,
                    mutable: true,
                }
            }

            TokenKind::Ident(name) => {
                self.advance();
                if self.check(TokenKind::LParen) {
                    // Variant with payload: `Some(p)`; `None()` is the
                    // explicit payload-free form.
                    self.advance();
                    let payload = if self.eat(TokenKind::RParen) {
                        None
                    } else {
                        let sub = self.parse_pattern()?;
                        self.expect(TokenKind::RParen)?;
                        Some(sub)
                    };
                    PatternKind::Variant { name, payload }
                } else if self.check(TokenKind::LBrace) {
                    self.parse_struct_pattern_body(name)?
                } else if self.check(TokenKind::Colon) {
                    self.advance();
                    let ty = self.parse_type()?;
                    PatternKind::Binding {
                        name,
                        ty: Some(ty),
                        mutable: false,
                    }
                } else {
                    PatternKind::Binding {
                        name,
                        ty: None,
                        mutable: false,
                    }
                }
            }

            TokenKind::LParen => {
                self.advance();
                if self.eat(TokenKind::RParen) {
                    PatternKind::Tuple(Vec::new())
                } else {
                    let mut subs = vec![self.parse_pattern()?];
                    let mut trailing_comma = false;
                    while self.eat(TokenKind::Comma) {
                        if self.check(TokenKind::RParen) {
                            trailing_comma = true;
                            break;
                        }
                        subs.push(self.parse_pattern()?);
                    }
                    self.expect(TokenKind::RParen)?;
                    if subs.len() == 1 && !trailing_comma {
                        // `(p)` is grouping, not a 1-tuple.
                        return Ok(subs.pop().expect("one element"));
                    }
                    PatternKind::Tuple(subs)
                }
            }

            // Prefix-open range: `..5`, `..='z'`.
            TokenKind::DotDot | TokenKind::DotDotEq => {
                let inclusive = self.check(TokenKind::DotDotEq);
                self.advance();
                let end = self.parse_literal_operand()?;
                PatternKind::Range {
                    start: None,
                    end: Some(end),
                    inclusive,
                }
            }

            kind if starts_literal(kind) => {
                let lit = self.parse_literal_operand()?;
                if self.check(TokenKind::DotDot) || self.check(TokenKind::DotDotEq) {
                    let inclusive = self.check(TokenKind::DotDotEq);
                    self.advance();
                    let end = if starts_literal(self.current_kind()) {
                        Some(self.parse_literal_operand()?)
                    } else {
                        None
                    };
                    PatternKind::Range {
                        start: Some(lit),
                        end,
                        inclusive,
                    }
                } else {
                    PatternKind::Literal(lit)
                }
            }

            other => {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    format!("expected pattern, found {}", other.display_name()),
                    self.current_span(),
                ))
            }
        };

        let span = start.merge(self.previous_span());
        Ok(self.alloc_pattern(kind, span))
    }

    /// Struct pattern fields with the brace already current:
    /// `{ x, y: p }`.
    fn parse_struct_pattern_body(
        &mut self,
        name: graft_ir::Name,
    ) -> Result<PatternKind, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let field_span = self.current_span();
            let field = self.expect_ident()?;
            let sub = if self.eat(TokenKind::Colon) {
                self.parse_pattern()?
            } else {
                // Shorthand: `x` binds the field to a name of the same
                // spelling.
                self.alloc_pattern(
                    PatternKind::Binding {
                        name: field,
                        ty: None,
                        mutable: false,
                    },
                    field_span,
                )
            };
            fields.push((field, sub));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(PatternKind::Struct { name, fields })
    }

    /// A literal usable in literal/range patterns, allocated as an arena
    /// expression so negative numbers reuse expression nodes.
    fn parse_literal_operand(&mut self) -> Result<ExprId, ParseError> {
        let span = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Int(v) => {
                self.advance();
                ExprKind::Int(int_literal(v, span)?)
            }
            TokenKind::Float(bits) => {
                self.advance();
                ExprKind::Float(bits)
            }
            TokenKind::Char(c) => {
                self.advance();
                ExprKind::Char(c)
            }
            TokenKind::Str(name) => {
                self.advance();
                ExprKind::Str(name)
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_literal_operand()?;
                ExprKind::Unary {
                    op: graft_ir::UnaryOp::Neg,
                    operand,
                }
            }
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1002,
                    format!("expected literal, found {}", other.display_name()),
                    span,
                ))
            }
        };
        let span = span.merge(self.previous_span());
        Ok(self.alloc_expr(kind, span))
    }

    pub(crate) fn alloc_pattern(&mut self, kind: PatternKind, span: Span) -> PatternId {
        self.arena_mut().alloc_pattern(Pattern::new(kind, span))
    }

    pub(crate) fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena_mut().alloc_expr(Expr::new(kind, span))
    }
}

/// Tokens that can begin a literal pattern.
fn starts_literal(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Char(_)
            | TokenKind::Str(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Minus
    )
}

/// Convert a lexed integer payload to `i64`, rejecting overflow.
pub(crate) fn int_literal(value: u64, span: Span) -> Result<i64, ParseError> {
    i64::try_from(value).map_err(|_| {
        ParseError::new(ErrorCode::E1002, "integer literal too large", span)
    })
}
