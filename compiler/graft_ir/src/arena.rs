//! Flat arena for AST nodes.
//!
//! Expressions, statements, and patterns of one compilation unit live in
//! contiguous vectors addressed by `u32` ids. The arena supports truncation
//! back to a recorded mark so the parser can speculate and roll back.

use crate::ast::{Expr, Pattern, Stmt};
use crate::{ExprId, PatternId, StmtId};

/// Arena owning every AST node of a compilation unit.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    patterns: Vec<Pattern>,
}

/// High-water marks for speculative parsing rollback.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ArenaMark {
    exprs: usize,
    stmts: usize,
    patterns: usize,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::from_raw(u32::try_from(self.exprs.len()).expect("arena overflow"));
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::from_raw(u32::try_from(self.stmts.len()).expect("arena overflow"));
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_pattern(&mut self, pattern: Pattern) -> PatternId {
        let id = PatternId::from_raw(u32::try_from(self.patterns.len()).expect("arena overflow"));
        self.patterns.push(pattern);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Record the current allocation state for later rollback.
    pub fn mark(&self) -> ArenaMark {
        ArenaMark {
            exprs: self.exprs.len(),
            stmts: self.stmts.len(),
            patterns: self.patterns.len(),
        }
    }

    /// Discard every node allocated after `mark`.
    ///
    /// Only valid when no surviving node references a discarded id; the
    /// parser guarantees this by rolling back whole speculative subtrees.
    pub fn truncate(&mut self, mark: ArenaMark) {
        debug_assert!(mark.exprs <= self.exprs.len());
        self.exprs.truncate(mark.exprs);
        self.stmts.truncate(mark.stmts);
        self.patterns.truncate(mark.patterns);
    }
}
