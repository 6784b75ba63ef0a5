//! Expression parsing: precedence cascade, postfix chains, casts,
//! control flow, blocks, and statements.

use crate::grammar::pattern::int_literal;
use crate::{ParseError, Parser};
use graft_diagnostic::ErrorCode;
use graft_ir::{
    BinaryOp, CastOp, ExprId, ExprKind, LetArm, MatchArm, Stmt, StmtId, StmtKind, TokenKind,
    UnaryOp,
};

/// Stack head-room management for deeply nested expressions: grow the
/// stack when less than the red zone remains.
const RED_ZONE: usize = 100 * 1024;
const STACK_PER_RECURSION: usize = 1024 * 1024;

fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

impl Parser<'_> {
    /// Parse a full expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_or())
    }

    fn parse_or(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.check(TokenKind::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = self.binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_bitor()?;
        while self.check(TokenKind::AndAnd) {
            self.advance();
            let rhs = self.parse_bitor()?;
            lhs = self.binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    /// Everything that binds tighter than `&&`; also the level at which a
    /// let-condition initializer and fallback sources are parsed, so `&&`
    /// splits clauses.
    pub(crate) fn parse_bitor(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_bitxor()?;
        while self.check(TokenKind::Pipe) {
            self.advance();
            let rhs = self.parse_bitxor()?;
            lhs = self.binary(BinaryOp::BitOr, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_bitxor(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_bitand()?;
        while self.check(TokenKind::Caret) {
            self.advance();
            let rhs = self.parse_bitand()?;
            lhs = self.binary(BinaryOp::BitXor, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_bitand(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.check(TokenKind::Amp) {
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = self.binary(BinaryOp::BitAnd, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// Comparison operators. Without the `::` marker these are always
    /// operators; inside an unparenthesized const-generic argument a `>`
    /// ends the argument (closer) and any other comparison is rejected.
    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_shift()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Gt if self.no_angle => break,
                TokenKind::Lt | TokenKind::LtEq | TokenKind::GtEq if self.no_angle => {
                    return Err(self.ambiguous_const_generic(self.current_span()));
                }
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_shift()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_shift(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Shr if self.no_angle => break,
                TokenKind::Shl if self.no_angle => {
                    return Err(self.ambiguous_const_generic(self.current_span()));
                }
                TokenKind::Shl => BinaryOp::Shl,
                TokenKind::Shr => BinaryOp::Shr,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.parse_postfix(),
        };
        let start = self.current_span();
        self.advance();
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start.merge(self.previous_span());
        Ok(self.alloc_expr(ExprKind::Unary { op, operand }, span))
    }

    /// Postfix chain: calls, fields, indexing, the `::<` generic marker,
    /// and cast operators.
    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let mut expr = self.parse_primary()?;

        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    let args = self.parse_call_args()?;
                    let span = start.merge(self.previous_span());
                    expr = self.alloc_expr(
                        ExprKind::Call {
                            callee: expr,
                            generic_args: Vec::new(),
                            args,
                        },
                        span,
                    );
                }

                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect_ident()?;
                    let span = start.merge(self.previous_span());
                    expr = self.alloc_expr(
                        ExprKind::Field {
                            receiver: expr,
                            field,
                        },
                        span,
                    );
                }

                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    let span = start.merge(self.previous_span());
                    expr = self.alloc_expr(
                        ExprKind::Index {
                            receiver: expr,
                            index,
                        },
                        span,
                    );
                }

                // The scoping marker: `::` immediately followed by `<`
                // opens a generic-argument list. A `::` followed by
                // anything else is an error (Graft has no expression
                // paths).
                TokenKind::PathSep => {
                    if self.peek_kind() != TokenKind::Lt {
                        return Err(ParseError::new(
                            ErrorCode::E1001,
                            "expected `<` after `::`",
                            self.current_span(),
                        ));
                    }
                    self.advance();
                    let args = self
                        .parse_generic_arg_list()?
                        .into_iter()
                        .map(Into::into)
                        .collect();

                    if self.check(TokenKind::LParen) {
                        let call_args = self.parse_call_args()?;
                        let span = start.merge(self.previous_span());
                        expr = self.alloc_expr(
                            ExprKind::Call {
                                callee: expr,
                                generic_args: args,
                                args: call_args,
                            },
                            span,
                        );
                    } else {
                        let span = start.merge(self.previous_span());
                        expr = self.alloc_expr(ExprKind::Instantiate { base: expr, args }, span);
                    }
                }

                kind if cast_operator(kind).is_some() => {
                    let op = cast_operator(kind).expect("guard checked");
                    self.advance();
                    let ty = if starts_type(self.current_kind()) {
                        Some(self.parse_type()?)
                    } else {
                        None
                    };
                    let span = start.merge(self.previous_span());
                    expr = self.alloc_expr(
                        ExprKind::Cast {
                            operand: expr,
                            op,
                            ty,
                        },
                        span,
                    );
                }

                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> Result<Vec<ExprId>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.with_reset_restrictions(Self::parse_expr)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
                if self.check(TokenKind::RParen) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let span = self.current_span();
        match self.current_kind() {
            TokenKind::Int(v) => {
                self.advance();
                let value = int_literal(v, span)?;
                Ok(self.alloc_expr(ExprKind::Int(value), span))
            }
            TokenKind::Float(bits) => {
                self.advance();
                Ok(self.alloc_expr(ExprKind::Float(bits), span))
            }
            TokenKind::True => {
                self.advance();
                Ok(self.alloc_expr(ExprKind::Bool(true), span))
            }
            TokenKind::False => {
                self.advance();
                Ok(self.alloc_expr(ExprKind::Bool(false), span))
            }
            TokenKind::Char(c) => {
                self.advance();
                Ok(self.alloc_expr(ExprKind::Char(c), span))
            }
            TokenKind::Str(name) => {
                self.advance();
                Ok(self.alloc_expr(ExprKind::Str(name), span))
            }

            TokenKind::Ident(name) => {
                self.advance();
                if self.check(TokenKind::LBrace) && !self.no_struct_lit {
                    self.parse_struct_literal(name, span)
                } else {
                    Ok(self.alloc_expr(ExprKind::Ident(name), span))
                }
            }

            TokenKind::LParen => {
                self.advance();
                if self.eat(TokenKind::RParen) {
                    let span = span.merge(self.previous_span());
                    return Ok(self.alloc_expr(ExprKind::Unit, span));
                }
                let result = self.with_reset_restrictions(|p| {
                    let mut elems = vec![p.parse_expr()?];
                    let mut trailing_comma = false;
                    while p.eat(TokenKind::Comma) {
                        if p.check(TokenKind::RParen) {
                            trailing_comma = true;
                            break;
                        }
                        elems.push(p.parse_expr()?);
                    }
                    Ok((elems, trailing_comma))
                })?;
                let (mut elems, trailing_comma) = result;
                self.expect(TokenKind::RParen)?;
                if elems.len() == 1 && !trailing_comma {
                    Ok(elems.pop().expect("one element"))
                } else {
                    let span = span.merge(self.previous_span());
                    Ok(self.alloc_expr(ExprKind::TupleLit(elems), span))
                }
            }

            TokenKind::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                if !self.check(TokenKind::RBracket) {
                    loop {
                        elems.push(self.with_reset_restrictions(Self::parse_expr)?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                        if self.check(TokenKind::RBracket) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket)?;
                let span = span.merge(self.previous_span());
                Ok(self.alloc_expr(ExprKind::ArrayLit(elems), span))
            }

            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Loop => {
                self.advance();
                let body = self.parse_block()?;
                let span = span.merge(self.previous_span());
                Ok(self.alloc_expr(ExprKind::Loop { body }, span))
            }
            TokenKind::Match => self.parse_match(),
            TokenKind::LBrace => self.parse_block(),

            TokenKind::Return => {
                self.advance();
                let value = if starts_expr(self.current_kind()) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                let span = span.merge(self.previous_span());
                Ok(self.alloc_expr(ExprKind::Return(value), span))
            }
            TokenKind::Break => {
                self.advance();
                Ok(self.alloc_expr(ExprKind::Break, span))
            }
            TokenKind::Continue => {
                self.advance();
                Ok(self.alloc_expr(ExprKind::Continue, span))
            }

            TokenKind::Let if self.allow_let_cond => self.parse_let_cond(),

            other => Err(ParseError::new(
                ErrorCode::E1002,
                format!("expected expression, found {}", other.display_name()),
                span,
            )),
        }
    }

    /// Run `f` with the context restrictions lifted, as inside
    /// parentheses and brackets: angle restriction off, struct literals
    /// allowed, `let` conditions disallowed.
    fn with_reset_restrictions<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, ParseError>,
    ) -> Result<R, ParseError> {
        let saved = (self.no_angle, self.no_struct_lit, self.allow_let_cond);
        self.no_angle = false;
        self.no_struct_lit = false;
        self.allow_let_cond = false;
        let result = f(self);
        (self.no_angle, self.no_struct_lit, self.allow_let_cond) = saved;
        result
    }

    fn parse_struct_literal(
        &mut self,
        name: graft_ir::Name,
        start: graft_ir::Span,
    ) -> Result<ExprId, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let field = self.expect_ident()?;
            self.expect(TokenKind::Colon)?;
            let value = self.with_reset_restrictions(Self::parse_expr)?;
            fields.push((field, value));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Ok(self.alloc_expr(ExprKind::StructLit { name, fields }, span))
    }

    fn parse_if(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::If)?;

        let saved = (self.allow_let_cond, self.no_struct_lit);
        self.allow_let_cond = true;
        self.no_struct_lit = true;
        let cond = self.parse_expr();
        (self.allow_let_cond, self.no_struct_lit) = saved;
        let cond = cond?;

        let then_block = self.parse_block()?;
        let else_expr = if self.eat(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(self.parse_if()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        let span = start.merge(self.previous_span());
        Ok(self.alloc_expr(
            ExprKind::If {
                cond,
                then_block,
                else_expr,
            },
            span,
        ))
    }

    fn parse_while(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::While)?;

        let saved = (self.allow_let_cond, self.no_struct_lit);
        self.allow_let_cond = true;
        self.no_struct_lit = true;
        let cond = self.parse_expr();
        (self.allow_let_cond, self.no_struct_lit) = saved;
        let cond = cond?;

        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        Ok(self.alloc_expr(ExprKind::While { cond, body }, span))
    }

    fn parse_match(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::Match)?;

        let saved = self.no_struct_lit;
        self.no_struct_lit = true;
        let scrutinee = self.parse_expr();
        self.no_struct_lit = saved;
        let scrutinee = scrutinee?;

        self.expect(TokenKind::LBrace)?;
        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let arm_start = self.current_span();
            let pattern = self.parse_pattern()?;
            let guard = if self.eat(TokenKind::If) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(TokenKind::FatArrow)?;
            let body = self.parse_expr()?;
            arms.push(MatchArm {
                pattern,
                guard,
                body,
                span: arm_start.merge(self.previous_span()),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        let span = start.merge(self.previous_span());
        Ok(self.alloc_expr(ExprKind::Match { scrutinee, arms }, span))
    }

    /// `let P = E [else F]*` in condition position. The initializer and
    /// fallback sources parse just below `&&` so conjunction splits
    /// clauses.
    fn parse_let_cond(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::Let)?;
        let pattern = self.parse_pattern()?;
        self.expect(TokenKind::Eq)?;
        let init = self.parse_bitor()?;

        let mut fallbacks = Vec::new();
        // An `else` followed by `{` is not a value fallback; it belongs
        // to the surrounding construct.
        while self.check(TokenKind::Else) && self.peek_kind() != TokenKind::LBrace {
            self.advance();
            fallbacks.push(self.parse_bitor()?);
        }

        let span = start.merge(self.previous_span());
        Ok(self.alloc_expr(
            ExprKind::LetCond {
                pattern,
                init,
                fallbacks,
            },
            span,
        ))
    }

    /// Parse a block expression: `{ stmt* tail? }`.
    pub(crate) fn parse_block(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::LBrace)?;

        let saved = (self.allow_let_cond, self.no_struct_lit, self.no_angle);
        self.allow_let_cond = false;
        self.no_struct_lit = false;
        self.no_angle = false;

        let result = self.parse_block_body(start);

        (self.allow_let_cond, self.no_struct_lit, self.no_angle) = saved;
        result
    }

    fn parse_block_body(&mut self, start: graft_ir::Span) -> Result<ExprId, ParseError> {
        let mut stmts = Vec::new();
        let mut tail = None;

        while !self.check(TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(ParseError::new(
                    ErrorCode::E1003,
                    "unclosed block",
                    start,
                ));
            }
            if self.eat(TokenKind::Semi) {
                continue;
            }
            if self.check(TokenKind::Let) {
                stmts.push(self.parse_let_stmt()?);
                continue;
            }

            let expr = self.parse_expr()?;
            if self.eat(TokenKind::Eq) {
                let value = self.parse_expr()?;
                self.expect(TokenKind::Semi)?;
                stmts.push(self.alloc_stmt(StmtKind::Assign {
                    target: expr,
                    value,
                }));
            } else if self.eat(TokenKind::Semi) {
                stmts.push(self.alloc_stmt(StmtKind::Expr(expr)));
            } else if self.check(TokenKind::RBrace) {
                tail = Some(expr);
                break;
            } else if is_block_expr(&self.arena().expr(expr).kind) {
                // Block-like expressions stand as statements without `;`.
                stmts.push(self.alloc_stmt(StmtKind::Expr(expr)));
            } else {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    format!(
                        "expected `;` or `}}`, found {}",
                        self.current_kind().display_name()
                    ),
                    self.current_span(),
                ));
            }
        }

        self.expect(TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Ok(self.alloc_expr(ExprKind::Block { stmts, tail }, span))
    }

    /// `let P [: T] = E [else P = E]* [else { block }] ;`
    fn parse_let_stmt(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::Let)?;

        let mut arms = Vec::new();
        let mut terminal = None;
        loop {
            let arm_start = self.current_span();
            let pattern = self.parse_pattern()?;
            let ty = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            self.expect(TokenKind::Eq)?;
            let init = self.parse_expr()?;
            arms.push(LetArm {
                pattern,
                ty,
                init,
                span: arm_start.merge(self.previous_span()),
            });

            if self.eat(TokenKind::Else) {
                if self.check(TokenKind::LBrace) {
                    terminal = Some(self.parse_block()?);
                    break;
                }
                continue;
            }
            break;
        }
        self.expect(TokenKind::Semi)?;

        let span = start.merge(self.previous_span());
        let stmt = Stmt::new(StmtKind::Let { arms, terminal }, span);
        Ok(self.arena_mut().alloc_stmt(stmt))
    }

    fn alloc_stmt(&mut self, kind: StmtKind) -> StmtId {
        let span = self.previous_span();
        self.arena_mut().alloc_stmt(Stmt::new(kind, span))
    }

    fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let span = self
            .arena()
            .expr(lhs)
            .span
            .merge(self.arena().expr(rhs).span);
        self.alloc_expr(ExprKind::Binary { op, lhs, rhs }, span)
    }
}

/// Map a cast token to its operator.
fn cast_operator(kind: TokenKind) -> Option<CastOp> {
    match kind {
        TokenKind::Hash => Some(CastOp::Reliable),
        TokenKind::Dollar => Some(CastOp::Integer),
        TokenKind::HashQuestion => Some(CastOp::Unreliable),
        TokenKind::HashTilde => Some(CastOp::Unsafe),
        TokenKind::Bitcast => Some(CastOp::Bit),
        _ => None,
    }
}

/// Tokens that can begin a type after a cast operator. `(` is included so
/// tuple destinations parse; a parenthesized *expression* cannot follow a
/// cast operator anyway.
fn starts_type(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::RawPtr
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::LParen
    )
}

/// Tokens that can begin an expression; used after `return`.
fn starts_expr(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Char(_)
            | TokenKind::Ident(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::If
            | TokenKind::Match
            | TokenKind::Loop
            | TokenKind::While
            | TokenKind::Return
            | TokenKind::Break
            | TokenKind::Continue
    )
}

/// Expressions that may stand as statements without a semicolon.
fn is_block_expr(kind: &ExprKind) -> bool {
    matches!(
        kind,
        ExprKind::If { .. }
            | ExprKind::While { .. }
            | ExprKind::Loop { .. }
            | ExprKind::Match { .. }
            | ExprKind::Block { .. }
    )
}
