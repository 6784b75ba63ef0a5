//! AST node definitions.

mod decl;
mod expr;
mod operators;
mod pattern;
mod stmt;

pub use decl::{
    Decl, DeclKind, EnumVariantDecl, FieldDecl, FnDecl, SumVariantDecl, Unit,
};
pub use expr::{Expr, ExprKind, GenericArg, MatchArm};
pub use operators::{BinaryOp, CastOp, UnaryOp};
pub use pattern::{Pattern, PatternKind};
pub use stmt::{LetArm, Stmt, StmtKind};
