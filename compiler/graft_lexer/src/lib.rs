//! Lexer for the Graft compiler.
//!
//! Scans source text with a logos-generated scanner, then cooks raw tokens
//! into `graft_ir` tokens: identifiers and strings are interned, numeric
//! literals parsed, escapes decoded. The output `TokenList` always ends
//! with `Eof`.

mod convert;
mod lex_error;
mod raw_token;

pub use lex_error::LexError;
pub use raw_token::RawToken;

use graft_ir::{Span, StringInterner, TokenList};
use logos::Logos;

/// The result of lexing one compilation unit.
#[derive(Debug)]
pub struct LexOutput {
    pub tokens: TokenList,
    pub errors: Vec<LexError>,
}

impl LexOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Lex `source` into a token list.
///
/// Scanning continues past errors: an unrecognized character is reported
/// and skipped so the parser still receives a usable stream.
pub fn lex(source: &str, interner: &StringInterner) -> LexOutput {
    let mut tokens = TokenList::new();
    let mut errors = Vec::new();

    let mut lexer = RawToken::lexer(source);
    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        match result {
            Ok(raw) => match convert::cook_token(raw, lexer.slice(), span, interner) {
                Ok(token) => tokens.push(token),
                Err(err) => errors.push(err),
            },
            Err(()) => {
                errors.push(LexError::new(
                    format!("unrecognized character `{}`", lexer.slice()),
                    span,
                ));
            }
        }
    }

    let end = u32::try_from(source.len()).expect("source exceeds u32::MAX bytes");
    tokens.finish(end);
    LexOutput { tokens, errors }
}
