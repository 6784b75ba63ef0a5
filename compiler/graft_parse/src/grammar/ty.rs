//! Type expression parsing.

use crate::{ParseError, Parser};
use graft_diagnostic::ErrorCode;
use graft_ir::{ParsedType, TokenKind};

impl Parser<'_> {
    /// Parse a type expression.
    ///
    /// `type := '*' type | 'rawptr' | '(' ... ')' | '[' type (';' INT)? ']'
    ///        | IDENT ('<' args '>')?`
    pub(crate) fn parse_type(&mut self) -> Result<ParsedType, ParseError> {
        match self.current_kind() {
            TokenKind::Star => {
                self.advance();
                let target = self.parse_type()?;
                Ok(ParsedType::Ptr(Box::new(target)))
            }

            TokenKind::RawPtr => {
                self.advance();
                Ok(ParsedType::RawPtr)
            }

            TokenKind::LParen => {
                self.advance();
                if self.eat(TokenKind::RParen) {
                    return Ok(ParsedType::Unit);
                }
                let mut elems = vec![self.parse_type()?];
                let mut trailing_comma = false;
                while self.eat(TokenKind::Comma) {
                    if self.check(TokenKind::RParen) {
                        trailing_comma = true;
                        break;
                    }
                    elems.push(self.parse_type()?);
                }
                self.expect(TokenKind::RParen)?;
                // `(T)` is a parenthesized type; `(T,)` is a 1-tuple.
                if elems.len() == 1 && !trailing_comma {
                    Ok(elems.pop().expect("one element"))
                } else {
                    Ok(ParsedType::Tuple(elems))
                }
            }

            TokenKind::LBracket => {
                self.advance();
                let elem = Box::new(self.parse_type()?);
                if self.eat(TokenKind::Semi) {
                    let len_span = self.current_span();
                    let TokenKind::Int(len) = self.current_kind() else {
                        return Err(ParseError::new(
                            ErrorCode::E1005,
                            "array length must be an integer literal",
                            len_span,
                        ));
                    };
                    self.advance();
                    self.expect(TokenKind::RBracket)?;
                    Ok(ParsedType::Array { elem, len })
                } else {
                    self.expect(TokenKind::RBracket)?;
                    Ok(ParsedType::Slice(elem))
                }
            }

            TokenKind::Ident(name) => {
                self.advance();
                // Type position is unambiguous: a bare `<` here always
                // opens an argument list.
                let args = if self.check(TokenKind::Lt) {
                    self.parse_generic_arg_list()?
                } else {
                    Vec::new()
                };
                Ok(ParsedType::Named { name, args })
            }

            other => Err(ParseError::new(
                ErrorCode::E1005,
                format!("expected type, found {}", other.display_name()),
                self.current_span(),
            )),
        }
    }
}
