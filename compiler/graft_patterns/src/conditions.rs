//! Conjunctive `if let` condition lowering.
//!
//! A let-condition is a `&&`-joined sequence of pattern clauses and plain
//! boolean expressions, evaluated left to right with short-circuiting.
//! Bindings from an earlier clause are visible to later clauses and to the
//! body. `||` is rejected anywhere a `let` clause occurs beneath it: a
//! binding produced by only one disjunct has no single well-defined type.

use graft_ir::{BinaryOp, ExprArena, ExprId, ExprKind, PatternId, Span};

use crate::PatternError;

/// One clause of a lowered let-condition, in evaluation order.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CondClause {
    /// `let P = E [else F]*`
    Let {
        pattern: PatternId,
        init: ExprId,
        fallbacks: Vec<ExprId>,
        span: Span,
    },
    /// An ordinary boolean sub-expression.
    Bool(ExprId),
}

/// Flatten an `if` condition into ordered clauses.
///
/// Fails with `AmbiguousBindingUnion` when a `let` clause occurs anywhere
/// under a `||`.
pub fn lower_condition(
    arena: &ExprArena,
    cond: ExprId,
) -> Result<Vec<CondClause>, PatternError> {
    let mut clauses = Vec::new();
    lower_into(arena, cond, &mut clauses)?;
    Ok(clauses)
}

fn lower_into(
    arena: &ExprArena,
    cond: ExprId,
    clauses: &mut Vec<CondClause>,
) -> Result<(), PatternError> {
    let expr = arena.expr(cond);
    match &expr.kind {
        ExprKind::Binary {
            op: BinaryOp::And,
            lhs,
            rhs,
        } => {
            lower_into(arena, *lhs, clauses)?;
            lower_into(arena, *rhs, clauses)?;
            Ok(())
        }

        ExprKind::Binary {
            op: BinaryOp::Or,
            lhs,
            rhs,
        } => {
            if contains_let_clause(arena, *lhs) || contains_let_clause(arena, *rhs) {
                return Err(PatternError::AmbiguousBindingUnion { span: expr.span });
            }
            clauses.push(CondClause::Bool(cond));
            Ok(())
        }

        ExprKind::LetCond {
            pattern,
            init,
            fallbacks,
        } => {
            clauses.push(CondClause::Let {
                pattern: *pattern,
                init: *init,
                fallbacks: fallbacks.clone(),
                span: expr.span,
            });
            Ok(())
        }

        _ => {
            if contains_let_clause(arena, cond) {
                // A let clause nested under anything but `&&` has no
                // defined scope; `||` is the one surface form that can
                // produce this.
                return Err(PatternError::AmbiguousBindingUnion { span: expr.span });
            }
            clauses.push(CondClause::Bool(cond));
            Ok(())
        }
    }
}

/// Whether the expression tree contains a `let` condition clause.
fn contains_let_clause(arena: &ExprArena, expr: ExprId) -> bool {
    match &arena.expr(expr).kind {
        ExprKind::LetCond { .. } => true,
        ExprKind::Binary { lhs, rhs, .. } => {
            contains_let_clause(arena, *lhs) || contains_let_clause(arena, *rhs)
        }
        ExprKind::Unary { operand, .. } => contains_let_clause(arena, *operand),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_ir::{Expr, Pattern, PatternKind, Name};

    struct Builder {
        arena: ExprArena,
    }

    impl Builder {
        fn new() -> Self {
            Builder {
                arena: ExprArena::new(),
            }
        }

        fn expr(&mut self, kind: ExprKind) -> ExprId {
            self.arena.alloc_expr(Expr::new(kind, Span::new(0, 4)))
        }

        fn let_cond(&mut self) -> ExprId {
            let pattern = self
                .arena
                .alloc_pattern(Pattern::new(PatternKind::Wildcard, Span::DUMMY));
            let init = self.expr(ExprKind::Ident(Name::from_raw(1)));
            self.expr(ExprKind::LetCond {
                pattern,
                init,
                fallbacks: Vec::new(),
            })
        }

        fn and(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
            self.expr(ExprKind::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            })
        }

        fn or(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
            self.expr(ExprKind::Binary {
                op: BinaryOp::Or,
                lhs,
                rhs,
            })
        }
    }

    #[test]
    fn test_conjunction_preserves_order() {
        let mut b = Builder::new();
        let first = b.let_cond();
        let cond = b.expr(ExprKind::Bool(true));
        let second = b.let_cond();
        let left = b.and(first, cond);
        let root = b.and(left, second);

        let clauses = lower_condition(&b.arena, root).unwrap();
        assert_eq!(clauses.len(), 3);
        assert!(matches!(clauses[0], CondClause::Let { .. }));
        assert!(matches!(clauses[1], CondClause::Bool(_)));
        assert!(matches!(clauses[2], CondClause::Let { .. }));
    }

    #[test]
    fn test_disjunction_of_lets_rejected() {
        // if let Some(x) = a || let Some(x) = b { } — ambiguous union.
        let mut b = Builder::new();
        let lhs = b.let_cond();
        let rhs = b.let_cond();
        let root = b.or(lhs, rhs);

        let err = lower_condition(&b.arena, root).unwrap_err();
        assert!(matches!(err, PatternError::AmbiguousBindingUnion { .. }));
    }

    #[test]
    fn test_disjunction_without_lets_allowed() {
        let mut b = Builder::new();
        let lhs = b.expr(ExprKind::Bool(true));
        let rhs = b.expr(ExprKind::Bool(false));
        let or = b.or(lhs, rhs);
        let letc = b.let_cond();
        let root = b.and(or, letc);

        let clauses = lower_condition(&b.arena, root).unwrap();
        assert_eq!(clauses.len(), 2);
        assert!(matches!(clauses[0], CondClause::Bool(_)));
    }

    #[test]
    fn test_let_nested_under_or_via_and_rejected() {
        // (let P = a && x) || y — the let leaks into a disjunct.
        let mut b = Builder::new();
        let letc = b.let_cond();
        let x = b.expr(ExprKind::Bool(true));
        let lhs = b.and(letc, x);
        let y = b.expr(ExprKind::Bool(false));
        let root = b.or(lhs, y);

        let err = lower_condition(&b.arena, root).unwrap_err();
        assert!(matches!(err, PatternError::AmbiguousBindingUnion { .. }));
    }

    #[test]
    fn test_fallbacks_carried_through() {
        let mut b = Builder::new();
        let pattern = b
            .arena
            .alloc_pattern(Pattern::new(PatternKind::Wildcard, Span::DUMMY));
        let init = b.expr(ExprKind::Ident(Name::from_raw(1)));
        let alt = b.expr(ExprKind::Ident(Name::from_raw(2)));
        let root = b.expr(ExprKind::LetCond {
            pattern,
            init,
            fallbacks: vec![alt],
        });

        let clauses = lower_condition(&b.arena, root).unwrap();
        let CondClause::Let { fallbacks, .. } = &clauses[0] else {
            panic!("expected let clause");
        };
        assert_eq!(fallbacks.len(), 1);
    }
}
