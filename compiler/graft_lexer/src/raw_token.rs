//! Raw token definitions for the logos scanner.
//!
//! Raw tokens are uncooked: literal payloads are still source slices. The
//! conversion layer interns identifiers and strings and parses numbers.

use logos::Logos;

/// Raw tokens as recognized by the generated scanner.
#[derive(Logos, Copy, Clone, Eq, PartialEq, Debug)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum RawToken {
    // Keywords
    #[token("fn")]
    Fn,
    #[token("let")]
    Let,
    #[token("mut")]
    Mut,
    #[token("else")]
    Else,
    #[token("if")]
    If,
    #[token("while")]
    While,
    #[token("loop")]
    Loop,
    #[token("match")]
    Match,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("sum")]
    Sum,
    #[token("union")]
    Union,
    #[token("tuple")]
    Tuple,
    #[token("newtype")]
    Newtype,
    #[token("subtype")]
    Subtype,
    #[token("bitcast")]
    Bitcast,
    #[token("rawptr")]
    RawPtr,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("_", priority = 3)]
    Underscore,

    // Literals
    #[regex(r"[0-9][0-9_]*")]
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*")]
    Int,
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    Float,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,
    #[regex(r"'([^'\\\n]|\\.)'")]
    Char,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("..=")]
    DotDotEq,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("::")]
    PathSep,

    // Operators
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,

    // Cast operators
    #[token("#")]
    Hash,
    #[token("#?")]
    HashQuestion,
    #[token("#~")]
    HashTilde,
    #[token("$")]
    Dollar,
}
