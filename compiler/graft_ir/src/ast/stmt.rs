//! Statement nodes.

use crate::{ExprId, ParsedType, PatternId, Span, Spanned};

/// Statement node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

/// One arm of a `let` / `let-else` chain: `let P [: T] = E`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LetArm {
    pub pattern: PatternId,
    /// Explicit annotation on the whole binding, if any.
    pub ty: Option<ParsedType>,
    pub init: ExprId,
    pub span: Span,
}

/// Statement variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// `let P1 = E1 else P2 = E2 ... [else { terminal }];`
    ///
    /// A plain `let` has one arm and no terminal block. A chain attempts
    /// each arm left to right; the terminal block runs only when every arm
    /// is unmatched and must diverge.
    Let {
        arms: Vec<LetArm>,
        /// Terminal divergent block of a `let-else` chain.
        terminal: Option<ExprId>,
    },

    /// Assignment to a mutable place: `x = E;`, `p.field = E;`.
    Assign { target: ExprId, value: ExprId },

    /// Expression statement, with or without a trailing semicolon.
    Expr(ExprId),
}
