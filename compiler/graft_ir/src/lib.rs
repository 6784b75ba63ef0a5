//! Graft IR - core data structures shared by all compiler phases.
//!
//! This crate contains:
//! - `Span` for source locations
//! - `Name` / `StringInterner` for interned identifiers
//! - `Token`, `TokenKind`, `TokenList` for lexer output
//! - AST nodes (`Expr`, `Stmt`, `Pattern`, `Decl`, ...) and the flat
//!   `ExprArena` that owns them
//! - `ParsedType` for syntactic type expressions
//!
//! # Design
//!
//! - Strings are interned to `Name(u32)`; floats are stored as raw bits so
//!   every node is `Eq + Hash`.
//! - AST children are `u32` arena indices, not boxes; the arena supports
//!   mark/truncate for speculative parsing.

pub mod ast;

mod arena;
mod ids;
mod name;
mod parsed_type;
mod span;
mod token;

pub use arena::{ArenaMark, ExprArena};
pub use ast::{
    BinaryOp, CastOp, Decl, DeclKind, EnumVariantDecl, Expr, ExprKind, FieldDecl, FnDecl,
    GenericArg, LetArm, MatchArm, Pattern, PatternKind, Stmt, StmtKind, SumVariantDecl, UnaryOp,
    Unit,
};
pub use ids::{ExprId, PatternId, StmtId};
pub use name::{Name, SharedInterner, StringInterner};
pub use parsed_type::{ParsedType, ParsedTypeArg};
pub use span::{Span, Spanned};
pub use token::{Token, TokenKind, TokenList};
