//! Cooking raw tokens into `graft_ir` tokens.
//!
//! Interns identifiers and string literals, parses numeric literals, and
//! decodes escape sequences.

use crate::{LexError, RawToken};
use graft_ir::{Name, Span, StringInterner, Token, TokenKind};

/// Convert one raw token into a cooked `TokenKind`.
///
/// `slice` is the matched source text; errors carry `span`.
pub(crate) fn cook(
    raw: RawToken,
    slice: &str,
    span: Span,
    interner: &StringInterner,
) -> Result<TokenKind, LexError> {
    let kind = match raw {
        RawToken::Fn => TokenKind::Fn,
        RawToken::Let => TokenKind::Let,
        RawToken::Mut => TokenKind::Mut,
        RawToken::Else => TokenKind::Else,
        RawToken::If => TokenKind::If,
        RawToken::While => TokenKind::While,
        RawToken::Loop => TokenKind::Loop,
        RawToken::Match => TokenKind::Match,
        RawToken::Return => TokenKind::Return,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Enum => TokenKind::Enum,
        RawToken::Sum => TokenKind::Sum,
        RawToken::Union => TokenKind::Union,
        RawToken::Tuple => TokenKind::Tuple,
        RawToken::Newtype => TokenKind::Newtype,
        RawToken::Subtype => TokenKind::Subtype,
        RawToken::Bitcast => TokenKind::Bitcast,
        RawToken::RawPtr => TokenKind::RawPtr,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Underscore => TokenKind::Underscore,

        RawToken::Int => TokenKind::Int(parse_int(slice, span)?),
        RawToken::Float => TokenKind::Float(parse_float(slice, span)?),
        RawToken::Str => TokenKind::Str(cook_string(slice, span, interner)?),
        RawToken::Char => TokenKind::Char(cook_char(slice, span)?),
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Dot => TokenKind::Dot,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::DotDotEq => TokenKind::DotDotEq,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::PathSep => TokenKind::PathSep,
        RawToken::Eq => TokenKind::Eq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::AndAnd => TokenKind::AndAnd,
        RawToken::OrOr => TokenKind::OrOr,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Hash => TokenKind::Hash,
        RawToken::HashQuestion => TokenKind::HashQuestion,
        RawToken::HashTilde => TokenKind::HashTilde,
        RawToken::Dollar => TokenKind::Dollar,
    };
    Ok(kind)
}

fn parse_int(slice: &str, span: Span) -> Result<u64, LexError> {
    let cleaned: String = slice.chars().filter(|&c| c != '_').collect();
    let result = if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else {
        cleaned.parse::<u64>()
    };
    result.map_err(|_| LexError::new(format!("integer literal `{slice}` is too large"), span))
}

fn parse_float(slice: &str, span: Span) -> Result<u64, LexError> {
    let cleaned: String = slice.chars().filter(|&c| c != '_').collect();
    cleaned
        .parse::<f64>()
        .map(f64::to_bits)
        .map_err(|_| LexError::new(format!("invalid float literal `{slice}`"), span))
}

fn cook_string(slice: &str, span: Span, interner: &StringInterner) -> Result<Name, LexError> {
    // Strip the surrounding quotes; the regex guarantees they are present.
    let body = &slice[1..slice.len() - 1];
    let unescaped = unescape(body, span)?;
    Ok(interner.intern(&unescaped))
}

fn cook_char(slice: &str, span: Span) -> Result<char, LexError> {
    let body = &slice[1..slice.len() - 1];
    let unescaped = unescape(body, span)?;
    let mut chars = unescaped.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LexError::new(
            "char literal must contain exactly one character",
            span,
        )),
    }
}

/// Decode backslash escapes: `\n \r \t \0 \\ \' \"`.
fn unescape(body: &str, span: Span) -> Result<String, LexError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            other => {
                return Err(LexError::new(
                    format!(
                        "unknown escape sequence `\\{}`",
                        other.map(String::from).unwrap_or_default()
                    ),
                    span,
                ))
            }
        }
    }
    Ok(out)
}

/// Cook an entire raw scan into a token, used by the `lex` loop.
pub(crate) fn cook_token(
    raw: RawToken,
    slice: &str,
    span: Span,
    interner: &StringInterner,
) -> Result<Token, LexError> {
    Ok(Token::new(cook(raw, slice, span, interner)?, span))
}
