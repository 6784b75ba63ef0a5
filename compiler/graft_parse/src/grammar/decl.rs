//! Top-level declaration parsing.

use crate::{ParseError, Parser};
use graft_diagnostic::ErrorCode;
use graft_ir::{
    Decl, DeclKind, EnumVariantDecl, FieldDecl, FnDecl, SumVariantDecl, TokenKind,
};

impl Parser<'_> {
    /// Parse one top-level declaration.
    pub(crate) fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Newtype => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(TokenKind::Eq)?;
                let underlying = self.parse_type()?;
                self.expect(TokenKind::Semi)?;
                DeclKind::Newtype { name, underlying }
            }

            TokenKind::Subtype => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(TokenKind::Eq)?;
                let parent = self.parse_type()?;
                self.expect(TokenKind::Semi)?;
                DeclKind::Subtype { name, parent }
            }

            TokenKind::Struct => {
                self.advance();
                let name = self.expect_ident()?;
                let fields = self.parse_field_block()?;
                DeclKind::Struct { name, fields }
            }

            TokenKind::Union => {
                self.advance();
                let name = self.expect_ident()?;
                let fields = self.parse_field_block()?;
                DeclKind::Union { name, fields }
            }

            TokenKind::Tuple => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(TokenKind::Eq)?;
                self.expect(TokenKind::LParen)?;
                let mut elems = Vec::new();
                if !self.check(TokenKind::RParen) {
                    loop {
                        elems.push(self.parse_type()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                        if self.check(TokenKind::RParen) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Semi)?;
                DeclKind::TupleStruct { name, elems }
            }

            TokenKind::Enum => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(TokenKind::LBrace)?;
                let mut variants = Vec::new();
                while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                    let variant_start = self.current_span();
                    let vname = self.expect_ident()?;
                    self.expect(TokenKind::Eq)?;
                    let value = self.parse_enum_value()?;
                    variants.push(EnumVariantDecl {
                        name: vname,
                        value,
                        span: variant_start.merge(self.previous_span()),
                    });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace)?;
                DeclKind::Enum { name, variants }
            }

            TokenKind::Sum => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(TokenKind::LBrace)?;
                let mut variants = Vec::new();
                loop {
                    let variant_start = self.current_span();
                    let vname = self.expect_ident()?;
                    let payload = if self.eat(TokenKind::LParen) {
                        let ty = self.parse_type()?;
                        self.expect(TokenKind::RParen)?;
                        Some(ty)
                    } else {
                        None
                    };
                    variants.push(SumVariantDecl {
                        name: vname,
                        payload,
                        span: variant_start.merge(self.previous_span()),
                    });
                    if !self.eat(TokenKind::Pipe) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace)?;
                DeclKind::Sum { name, variants }
            }

            TokenKind::Fn => DeclKind::Fn(self.parse_fn()?),

            other => {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    format!("expected declaration, found {}", other.display_name()),
                    start,
                ))
            }
        };

        Ok(Decl {
            kind,
            span: start.merge(self.previous_span()),
        })
    }

    /// `{ name: type, ... }` for struct and union bodies.
    fn parse_field_block(&mut self) -> Result<Vec<FieldDecl>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let field_start = self.current_span();
            let name = self.expect_ident()?;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            fields.push(FieldDecl {
                name,
                ty,
                span: field_start.merge(self.previous_span()),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(fields)
    }

    fn parse_enum_value(&mut self) -> Result<i64, ParseError> {
        let negative = self.eat(TokenKind::Minus);
        let span = self.current_span();
        let TokenKind::Int(raw) = self.current_kind() else {
            return Err(ParseError::new(
                ErrorCode::E1002,
                "enum variant value must be an integer literal",
                span,
            ));
        };
        self.advance();
        let value = i64::try_from(raw).map_err(|_| {
            ParseError::new(ErrorCode::E1002, "integer literal too large", span)
        })?;
        Ok(if negative { -value } else { value })
    }

    /// `fn name [<T, U>] (params) [-> type] { body }`
    fn parse_fn(&mut self) -> Result<FnDecl, ParseError> {
        let start = self.current_span();
        self.expect(TokenKind::Fn)?;
        let name = self.expect_ident()?;

        let mut generics = Vec::new();
        if self.eat(TokenKind::Lt) {
            loop {
                generics.push(self.expect_ident()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Gt)?;
        }

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            let pname = self.expect_ident()?;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            params.push((pname, ty));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let ret = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        Ok(FnDecl {
            name,
            generics,
            params,
            ret,
            body,
            span: start.merge(self.previous_span()),
        })
    }
}
