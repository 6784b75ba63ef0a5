//! Divergence checking for `let-else` terminal blocks.
//!
//! The terminal block of a `let-else` chain must not fall through
//! normally: every control path has to leave via `return`, `break`,
//! `continue`, or an equivalent non-local exit. The checker is
//! conservative — a path it cannot prove divergent is reported as the
//! reachable fallthrough path.

use graft_ir::{ExprArena, ExprId, ExprKind, Span, StmtKind};

/// Check that `block` diverges on every path.
///
/// Returns `Err(span)` citing the reachable fallthrough path: the trailing
/// expression, the last statement, or the block itself when empty.
pub fn check_diverges(arena: &ExprArena, block: ExprId) -> Result<(), Span> {
    let expr = arena.expr(block);
    let ExprKind::Block { stmts, tail } = &expr.kind else {
        // A bare expression in block position.
        return if expr_diverges(arena, block) {
            Ok(())
        } else {
            Err(expr.span)
        };
    };

    for &stmt_id in stmts {
        let stmt = arena.stmt(stmt_id);
        let diverges = match &stmt.kind {
            // The first arm's initializer always runs; a chain statement
            // diverges only if that initializer does.
            StmtKind::Let { arms, .. } => arms
                .first()
                .is_some_and(|arm| expr_diverges(arena, arm.init)),
            StmtKind::Assign { value, .. } => expr_diverges(arena, *value),
            StmtKind::Expr(expr) => expr_diverges(arena, *expr),
        };
        if diverges {
            // Everything after this statement is unreachable.
            return Ok(());
        }
    }

    match tail {
        Some(tail_expr) if expr_diverges(arena, *tail_expr) => Ok(()),
        Some(tail_expr) => Err(arena.expr(*tail_expr).span),
        None => match stmts.last() {
            Some(&last) => Err(arena.stmt(last).span),
            None => Err(expr.span),
        },
    }
}

/// Whether evaluating `expr` never completes normally.
fn expr_diverges(arena: &ExprArena, expr: ExprId) -> bool {
    match &arena.expr(expr).kind {
        ExprKind::Return(_) | ExprKind::Break | ExprKind::Continue => true,

        ExprKind::Block { .. } => check_diverges(arena, expr).is_ok(),

        ExprKind::If {
            cond: _,
            then_block,
            else_expr,
        } => match else_expr {
            Some(else_expr) => {
                expr_diverges(arena, *then_block) && expr_diverges(arena, *else_expr)
            }
            None => false,
        },

        ExprKind::Match { arms, .. } => {
            !arms.is_empty() && arms.iter().all(|arm| expr_diverges(arena, arm.body))
        }

        // An infinite loop diverges unless some break escapes it.
        ExprKind::Loop { body } => !contains_break(arena, *body),

        _ => false,
    }
}

/// Whether `expr` contains a `break` that would escape the *enclosing*
/// loop. Nested loops capture their own breaks.
fn contains_break(arena: &ExprArena, expr: ExprId) -> bool {
    match &arena.expr(expr).kind {
        ExprKind::Break => true,
        ExprKind::Loop { .. } | ExprKind::While { .. } => false,

        ExprKind::Block { stmts, tail } => {
            stmts.iter().any(|&stmt_id| match &arena.stmt(stmt_id).kind {
                StmtKind::Let { arms, terminal } => {
                    arms.iter().any(|arm| contains_break(arena, arm.init))
                        || terminal.is_some_and(|t| contains_break(arena, t))
                }
                StmtKind::Assign { target, value } => {
                    contains_break(arena, *target) || contains_break(arena, *value)
                }
                StmtKind::Expr(e) => contains_break(arena, *e),
            }) || tail.is_some_and(|t| contains_break(arena, t))
        }

        ExprKind::If {
            cond,
            then_block,
            else_expr,
        } => {
            contains_break(arena, *cond)
                || contains_break(arena, *then_block)
                || else_expr.is_some_and(|e| contains_break(arena, e))
        }

        ExprKind::Match { scrutinee, arms } => {
            contains_break(arena, *scrutinee)
                || arms.iter().any(|arm| {
                    contains_break(arena, arm.body)
                        || arm.guard.is_some_and(|g| contains_break(arena, g))
                })
        }

        ExprKind::Binary { lhs, rhs, .. } => {
            contains_break(arena, *lhs) || contains_break(arena, *rhs)
        }
        ExprKind::Unary { operand, .. } => contains_break(arena, *operand),
        ExprKind::Cast { operand, .. } => contains_break(arena, *operand),
        ExprKind::Call { callee, args, .. } => {
            contains_break(arena, *callee) || args.iter().any(|&a| contains_break(arena, a))
        }
        ExprKind::Instantiate { base, .. } => contains_break(arena, *base),
        ExprKind::Field { receiver, .. } => contains_break(arena, *receiver),
        ExprKind::Index { receiver, index } => {
            contains_break(arena, *receiver) || contains_break(arena, *index)
        }
        ExprKind::Return(value) => value.is_some_and(|v| contains_break(arena, v)),
        ExprKind::LetCond {
            init, fallbacks, ..
        } => {
            contains_break(arena, *init) || fallbacks.iter().any(|&f| contains_break(arena, f))
        }
        ExprKind::TupleLit(elems) | ExprKind::ArrayLit(elems) => {
            elems.iter().any(|&e| contains_break(arena, e))
        }
        ExprKind::StructLit { fields, .. } => {
            fields.iter().any(|&(_, e)| contains_break(arena, e))
        }

        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_ir::{Expr, Stmt};

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
            self.arena.alloc_expr(Expr::new(kind, Span::new(0, 1)))
        }

        fn block(&mut self, stmts: Vec<StmtKind>, tail: Option<ExprId>) -> ExprId {
            let stmts = stmts
                .into_iter()
                .map(|kind| self.arena.alloc_stmt(Stmt::new(kind, Span::new(2, 3))))
                .collect();
            self.expr(ExprKind::Block { stmts, tail })
        }
    }

    #[test]
    fn test_empty_block_falls_through() {
        let mut b = Builder::new();
        let block = b.block(vec![], None);
        let err = check_diverges(&b.arena, block).unwrap_err();
        // The cited path is the block itself.
        assert_eq!(err, Span::new(0, 1));
    }

    #[test]
    fn test_return_diverges() {
        let mut b = Builder::new();
        let ret = b.expr(ExprKind::Return(None));
        let block = b.block(vec![], Some(ret));
        assert!(check_diverges(&b.arena, block).is_ok());
    }

    #[test]
    fn test_break_and_continue_diverge() {
        for kind in [ExprKind::Break, ExprKind::Continue] {
            let mut b = Builder::new();
            let exit = b.expr(kind);
            let block = b.block(vec![], Some(exit));
            assert!(check_diverges(&b.arena, block).is_ok());
        }
    }

    #[test]
    fn test_trailing_value_cited_as_fallthrough() {
        let mut b = Builder::new();
        let value = b.expr(ExprKind::Int(1));
        let block = b.block(vec![], Some(value));
        let err = check_diverges(&b.arena, block).unwrap_err();
        assert_eq!(err, Span::new(0, 1));
    }

    #[test]
    fn test_if_requires_both_branches() {
        let mut b = Builder::new();
        let cond = b.expr(ExprKind::Bool(true));
        let ret = b.expr(ExprKind::Return(None));
        let then_block = b.block(vec![], Some(ret));

        // No else: can fall through.
        let partial = b.expr(ExprKind::If {
            cond,
            then_block,
            else_expr: None,
        });
        let block = b.block(vec![], Some(partial));
        assert!(check_diverges(&b.arena, block).is_err());

        // Both branches diverge.
        let cond2 = b.expr(ExprKind::Bool(true));
        let ret2 = b.expr(ExprKind::Return(None));
        let then2 = b.block(vec![], Some(ret2));
        let ret3 = b.expr(ExprKind::Return(None));
        let else2 = b.block(vec![], Some(ret3));
        let total = b.expr(ExprKind::If {
            cond: cond2,
            then_block: then2,
            else_expr: Some(else2),
        });
        let block2 = b.block(vec![], Some(total));
        assert!(check_diverges(&b.arena, block2).is_ok());
    }

    #[test]
    fn test_infinite_loop_diverges() {
        let mut b = Builder::new();
        let body = b.block(vec![], None);
        let looped = b.expr(ExprKind::Loop { body });
        let block = b.block(vec![], Some(looped));
        assert!(check_diverges(&b.arena, block).is_ok());
    }

    #[test]
    fn test_loop_with_break_falls_through() {
        let mut b = Builder::new();
        let brk = b.expr(ExprKind::Break);
        let body = b.block(vec![], Some(brk));
        let looped = b.expr(ExprKind::Loop { body });
        let block = b.block(vec![], Some(looped));
        assert!(check_diverges(&b.arena, block).is_err());
    }

    #[test]
    fn test_nested_loop_break_does_not_escape() {
        let mut b = Builder::new();
        // loop { loop { break } } — the break exits the inner loop only.
        let brk = b.expr(ExprKind::Break);
        let inner_body = b.block(vec![], Some(brk));
        let inner = b.expr(ExprKind::Loop { body: inner_body });
        let outer_body = b.block(vec![], Some(inner));
        let outer = b.expr(ExprKind::Loop { body: outer_body });
        let block = b.block(vec![], Some(outer));
        assert!(check_diverges(&b.arena, block).is_ok());
    }

    #[test]
    fn test_statement_divergence_shadows_rest() {
        let mut b = Builder::new();
        let ret = b.expr(ExprKind::Return(None));
        let value = b.expr(ExprKind::Int(5));
        let block = b.block(vec![StmtKind::Expr(ret)], Some(value));
        assert!(check_diverges(&b.arena, block).is_ok());
    }
}
