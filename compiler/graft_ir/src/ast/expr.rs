//! Expression nodes.
//!
//! Children are arena indices (`ExprId`, `StmtId`, `PatternId`), never
//! boxes; the arena owns every node of a compilation unit.

use crate::ast::operators::{BinaryOp, CastOp, UnaryOp};
use crate::{ExprId, Name, ParsedType, ParsedTypeArg, PatternId, Span, Spanned, StmtId};

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

/// A generic argument in expression position (`foo::<i32, (N > (M))>`).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum GenericArg {
    Type(ParsedType),
    Const(ExprId),
}

impl From<ParsedTypeArg> for GenericArg {
    fn from(arg: ParsedTypeArg) -> Self {
        match arg {
            ParsedTypeArg::Type(ty) => GenericArg::Type(ty),
            ParsedTypeArg::Const(expr) => GenericArg::Const(expr),
        }
    }
}

/// One arm of a `match` expression.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MatchArm {
    pub pattern: PatternId,
    /// Optional `if` guard.
    pub guard: Option<ExprId>,
    pub body: ExprId,
    pub span: Span,
}

/// Expression variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Integer literal: `42`.
    Int(i64),

    /// Float literal, stored as `f64` bits so the node stays `Eq + Hash`.
    Float(u64),

    /// Boolean literal.
    Bool(bool),

    /// Char literal: `'a'`.
    Char(char),

    /// String literal (interned).
    Str(Name),

    /// Unit: `()`.
    Unit,

    /// Variable reference.
    Ident(Name),

    /// Binary operation.
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },

    /// Unary operation.
    Unary { op: UnaryOp, operand: ExprId },

    /// Function call: `callee(args)`. Generic arguments come from a
    /// preceding `::<...>` instantiation if one was written.
    Call {
        callee: ExprId,
        generic_args: Vec<GenericArg>,
        args: Vec<ExprId>,
    },

    /// Standalone generic instantiation: `foo::<i32>` not followed by `(`.
    Instantiate { base: ExprId, args: Vec<GenericArg> },

    /// Field access: `receiver.field`.
    Field { receiver: ExprId, field: Name },

    /// Index access: `receiver[index]`.
    Index { receiver: ExprId, index: ExprId },

    /// Cast: `operand # T`, `operand $ T`, `operand #? T`, `operand #~ T`,
    /// `operand bitcast T`. The destination is `None` when omitted and to
    /// be inferred from context.
    Cast {
        operand: ExprId,
        op: CastOp,
        ty: Option<ParsedType>,
    },

    /// Conditional. The condition may contain `let` clauses (see
    /// [`ExprKind::LetCond`]); `else_expr` is another `if` or a block.
    If {
        cond: ExprId,
        then_block: ExprId,
        else_expr: Option<ExprId>,
    },

    /// Pattern-match clause inside an `if` condition:
    /// `let P = E` with optional value fallbacks `else F1 else F2`.
    ///
    /// Only valid in condition position; the parser rejects it elsewhere.
    LetCond {
        pattern: PatternId,
        init: ExprId,
        /// Alternative source expressions, tried in order when the match
        /// against `init` is unmatched.
        fallbacks: Vec<ExprId>,
    },

    /// `while cond { body }`.
    While { cond: ExprId, body: ExprId },

    /// `loop { body }`.
    Loop { body: ExprId },

    /// Block: `{ stmts; tail }`. `tail` is the trailing expression without
    /// a semicolon, if any.
    Block {
        stmts: Vec<StmtId>,
        tail: Option<ExprId>,
    },

    /// `match scrutinee { arms }`.
    Match {
        scrutinee: ExprId,
        arms: Vec<MatchArm>,
    },

    /// `return [value]`.
    Return(Option<ExprId>),

    /// `break`.
    Break,

    /// `continue`.
    Continue,

    /// Tuple literal: `(a, b)`.
    TupleLit(Vec<ExprId>),

    /// Array literal: `[a, b, c]`.
    ArrayLit(Vec<ExprId>),

    /// Struct literal: `Point { x: 0, y: 0 }`.
    StructLit {
        name: Name,
        fields: Vec<(Name, ExprId)>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_eq_hash() {
        use std::collections::HashSet;
        let a = Expr::new(ExprKind::Int(1), Span::new(0, 1));
        let b = Expr::new(ExprKind::Int(1), Span::new(0, 1));
        let c = Expr::new(ExprKind::Int(2), Span::new(0, 1));

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(c);
        assert_eq!(set.len(), 2);
    }
}
