//! Parser tests, including the generic-argument disambiguation cases.

use crate::{parse_expression, parse_unit, ParseError};
use graft_diagnostic::ErrorCode;
use graft_ir::{
    BinaryOp, CastOp, DeclKind, ExprArena, ExprId, ExprKind, GenericArg, ParsedType,
    PatternKind, StmtKind, StringInterner,
};
use pretty_assertions::assert_eq;

fn parse_expr_source(source: &str) -> (ExprId, ExprArena) {
    let interner = StringInterner::new();
    let out = graft_lexer::lex(source, &interner);
    assert!(!out.has_errors(), "lex errors: {:?}", out.errors);
    parse_expression(&out.tokens, &interner)
        .unwrap_or_else(|e| panic!("parse error for `{source}`: {e}"))
}

fn parse_expr_err(source: &str) -> ParseError {
    let interner = StringInterner::new();
    let out = graft_lexer::lex(source, &interner);
    assert!(!out.has_errors(), "lex errors: {:?}", out.errors);
    parse_expression(&out.tokens, &interner)
        .err()
        .unwrap_or_else(|| panic!("expected parse error for `{source}`"))
}

fn parse_unit_source(source: &str) -> crate::ParseResult {
    let interner = StringInterner::new();
    let out = graft_lexer::lex(source, &interner);
    assert!(!out.has_errors(), "lex errors: {:?}", out.errors);
    parse_unit(&out.tokens, &interner)
}

#[test]
fn test_precedence_mul_over_add() {
    let (root, arena) = parse_expr_source("1 + 2 * 3");
    let ExprKind::Binary {
        op: BinaryOp::Add,
        lhs,
        rhs,
    } = &arena.expr(root).kind
    else {
        panic!("expected addition at the root");
    };
    assert!(matches!(arena.expr(*lhs).kind, ExprKind::Int(1)));
    assert!(matches!(
        arena.expr(*rhs).kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_bare_less_than_is_comparison() {
    // Without the `::` marker, `<` is always an operator.
    let (root, arena) = parse_expr_source("foo < bar");
    assert!(matches!(
        arena.expr(root).kind,
        ExprKind::Binary {
            op: BinaryOp::Lt,
            ..
        }
    ));
}

#[test]
fn test_comparison_chain_left_assoc() {
    let (root, arena) = parse_expr_source("x < y > z");
    let ExprKind::Binary {
        op: BinaryOp::Gt,
        lhs,
        ..
    } = &arena.expr(root).kind
    else {
        panic!("expected `>` at the root");
    };
    assert!(matches!(
        arena.expr(*lhs).kind,
        ExprKind::Binary {
            op: BinaryOp::Lt,
            ..
        }
    ));
}

#[test]
fn test_shift_operators_plain() {
    let (root, arena) = parse_expr_source("a >> b << c");
    // Left-assoc: (a >> b) << c.
    assert!(matches!(
        arena.expr(root).kind,
        ExprKind::Binary {
            op: BinaryOp::Shl,
            ..
        }
    ));
}

#[test]
fn test_turbofish_call_with_const_generics() {
    // The flagship disambiguation case: two parenthesized const
    // arguments containing comparisons.
    let (root, arena) = parse_expr_source("foo::<(A > (B)), (C < D)>(E)");
    let ExprKind::Call {
        generic_args, args, ..
    } = &arena.expr(root).kind
    else {
        panic!("expected a call expression");
    };
    assert_eq!(args.len(), 1);
    assert_eq!(generic_args.len(), 2);
    for arg in generic_args {
        let GenericArg::Const(expr) = arg else {
            panic!("expected const argument, got {arg:?}");
        };
        assert!(matches!(
            arena.expr(*expr).kind,
            ExprKind::Binary {
                op: BinaryOp::Gt | BinaryOp::Lt,
                ..
            }
        ));
    }
}

#[test]
fn test_turbofish_type_arguments() {
    let (root, arena) = parse_expr_source("foo::<i32, u8>(x)");
    let ExprKind::Call { generic_args, .. } = &arena.expr(root).kind else {
        panic!("expected a call expression");
    };
    assert_eq!(generic_args.len(), 2);
    assert!(generic_args
        .iter()
        .all(|a| matches!(a, GenericArg::Type(ParsedType::Named { .. }))));
}

#[test]
fn test_turbofish_const_literal_argument() {
    let (root, arena) = parse_expr_source("buf::<16>(x)");
    let ExprKind::Call { generic_args, .. } = &arena.expr(root).kind else {
        panic!("expected a call expression");
    };
    let [GenericArg::Const(expr)] = generic_args.as_slice() else {
        panic!("expected one const argument");
    };
    assert!(matches!(arena.expr(*expr).kind, ExprKind::Int(16)));
}

#[test]
fn test_shr_splits_into_two_closers() {
    // `List<i32>` nested as a type argument: the closing `>>` lexes as
    // one shift token and must close both lists.
    let (root, arena) = parse_expr_source("foo::<List<i32>>(x)");
    let ExprKind::Call { generic_args, .. } = &arena.expr(root).kind else {
        panic!("expected a call expression");
    };
    let [GenericArg::Type(ParsedType::Named { args, .. })] = generic_args.as_slice() else {
        panic!("expected one type argument");
    };
    assert_eq!(args.len(), 1);
}

#[test]
fn test_standalone_instantiation() {
    let (root, arena) = parse_expr_source("foo::<i32>");
    assert!(matches!(
        arena.expr(root).kind,
        ExprKind::Instantiate { .. }
    ));
}

#[test]
fn test_unparenthesized_comparison_in_const_arg_rejected() {
    let err = parse_expr_err("foo::<A < B>(x)");
    assert_eq!(err.code, ErrorCode::E1102);
}

#[test]
fn test_unparenthesized_shift_in_const_arg_rejected() {
    let err = parse_expr_err("foo::<(A) << 2>(x)");
    assert_eq!(err.code, ErrorCode::E1102);
}

#[test]
fn test_unclosed_generic_list_at_eof() {
    let err = parse_expr_err("foo::<i32");
    assert_eq!(err.code, ErrorCode::E1101);
}

#[test]
fn test_shr_with_single_open_list_rejected() {
    let err = parse_expr_err("foo::<i32>>");
    assert_eq!(err.code, ErrorCode::E1101);
}

#[test]
fn test_cast_operators() {
    for (source, op) in [
        ("x # i64", CastOp::Reliable),
        ("x $ u8", CastOp::Integer),
        ("x #? char", CastOp::Unreliable),
        ("x #~ *Node", CastOp::Unsafe),
        ("x bitcast u32", CastOp::Bit),
    ] {
        let (root, arena) = parse_expr_source(source);
        let ExprKind::Cast {
            op: parsed_op, ty, ..
        } = &arena.expr(root).kind
        else {
            panic!("expected cast for `{source}`");
        };
        assert_eq!(*parsed_op, op, "operator for `{source}`");
        assert!(ty.is_some(), "destination for `{source}`");
    }
}

#[test]
fn test_cast_with_omitted_destination() {
    let (root, arena) = parse_expr_source("x #");
    let ExprKind::Cast { op, ty, .. } = &arena.expr(root).kind else {
        panic!("expected cast");
    };
    assert_eq!(*op, CastOp::Reliable);
    assert!(ty.is_none());
}

#[test]
fn test_cast_binds_tighter_than_binary() {
    // `a # i64 + b` is `(a # i64) + b`.
    let (root, arena) = parse_expr_source("a # i64 + b");
    let ExprKind::Binary {
        op: BinaryOp::Add,
        lhs,
        ..
    } = &arena.expr(root).kind
    else {
        panic!("expected addition at the root");
    };
    assert!(matches!(arena.expr(*lhs).kind, ExprKind::Cast { .. }));
}

#[test]
fn test_conjunctive_if_let_condition() {
    let (root, arena) =
        parse_expr_source("if let Some(x) = a && x > 1 && let Some(y) = b { y } else { 0 }");
    let ExprKind::If { cond, .. } = &arena.expr(root).kind else {
        panic!("expected if");
    };
    // (LetCond && bool) && LetCond
    let ExprKind::Binary {
        op: BinaryOp::And,
        lhs,
        rhs,
    } = &arena.expr(*cond).kind
    else {
        panic!("expected `&&` in condition");
    };
    assert!(matches!(arena.expr(*rhs).kind, ExprKind::LetCond { .. }));
    let ExprKind::Binary {
        op: BinaryOp::And,
        lhs: inner_lhs,
        ..
    } = &arena.expr(*lhs).kind
    else {
        panic!("expected nested `&&`");
    };
    assert!(matches!(
        arena.expr(*inner_lhs).kind,
        ExprKind::LetCond { .. }
    ));
}

#[test]
fn test_if_let_value_fallback() {
    let (root, arena) = parse_expr_source("if let Some(x) = a else b else c { x }");
    let ExprKind::If { cond, .. } = &arena.expr(root).kind else {
        panic!("expected if");
    };
    let ExprKind::LetCond { fallbacks, .. } = &arena.expr(*cond).kind else {
        panic!("expected let condition");
    };
    assert_eq!(fallbacks.len(), 2);
}

#[test]
fn test_if_let_with_trailing_else_branch() {
    // The `else { ... }` after the body belongs to the `if`, not the
    // fallback chain.
    let (root, arena) = parse_expr_source("if let Some(x) = a { x } else { 0 }");
    let ExprKind::If {
        cond, else_expr, ..
    } = &arena.expr(root).kind
    else {
        panic!("expected if");
    };
    let ExprKind::LetCond { fallbacks, .. } = &arena.expr(*cond).kind else {
        panic!("expected let condition");
    };
    assert!(fallbacks.is_empty());
    assert!(else_expr.is_some());
}

#[test]
fn test_let_outside_condition_rejected() {
    let err = parse_expr_err("let x = 1");
    assert_eq!(err.code, ErrorCode::E1002);
}

#[test]
fn test_disjunction_of_let_conditions_parses() {
    // `||` between let clauses parses; rejection (AmbiguousBindingUnion)
    // is the pattern resolver's job.
    let (root, arena) = parse_expr_source("if let Some(x) = a || let Some(x) = b { x }");
    let ExprKind::If { cond, .. } = &arena.expr(root).kind else {
        panic!("expected if");
    };
    assert!(matches!(
        arena.expr(*cond).kind,
        ExprKind::Binary {
            op: BinaryOp::Or,
            ..
        }
    ));
}

#[test]
fn test_match_expression() {
    let (root, arena) = parse_expr_source("match v { Some(x) => x, None() => 0, _ => 1 }");
    let ExprKind::Match { arms, .. } = &arena.expr(root).kind else {
        panic!("expected match");
    };
    assert_eq!(arms.len(), 3);
    assert!(matches!(
        arena.pattern(arms[0].pattern).kind,
        PatternKind::Variant { .. }
    ));
    assert!(matches!(
        arena.pattern(arms[2].pattern).kind,
        PatternKind::Wildcard
    ));
}

#[test]
fn test_match_arm_guard() {
    let (root, arena) = parse_expr_source("match v { x if x > 0 => x, _ => 0 }");
    let ExprKind::Match { arms, .. } = &arena.expr(root).kind else {
        panic!("expected match");
    };
    assert!(arms[0].guard.is_some());
}

#[test]
fn test_range_patterns() {
    let (root, arena) = parse_expr_source("match v { 1..=9 => 1, 'a'..'z' => 2, ..0 => 3, _ => 4 }");
    let ExprKind::Match { arms, .. } = &arena.expr(root).kind else {
        panic!("expected match");
    };
    let PatternKind::Range { inclusive, .. } = &arena.pattern(arms[0].pattern).kind else {
        panic!("expected range pattern");
    };
    assert!(*inclusive);
    assert!(matches!(
        arena.pattern(arms[2].pattern).kind,
        PatternKind::Range { start: None, .. }
    ));
}

#[test]
fn test_struct_literal_and_block_disambiguation() {
    // In condition position `{` opens the block, not a struct literal.
    let (root, arena) = parse_expr_source("if p { 1 } else { 2 }");
    let ExprKind::If { cond, .. } = &arena.expr(root).kind else {
        panic!("expected if");
    };
    assert!(matches!(arena.expr(*cond).kind, ExprKind::Ident(_)));

    // In ordinary position the struct literal parses.
    let (root, arena) = parse_expr_source("Point { x: 1, y: 2 }");
    let ExprKind::StructLit { fields, .. } = &arena.expr(root).kind else {
        panic!("expected struct literal");
    };
    assert_eq!(fields.len(), 2);
}

#[test]
fn test_block_with_statements_and_tail() {
    let (root, arena) = parse_expr_source("{ f(); g(); 42 }");
    let ExprKind::Block { stmts, tail } = &arena.expr(root).kind else {
        panic!("expected block");
    };
    assert_eq!(stmts.len(), 2);
    let tail = tail.expect("tail expression");
    assert!(matches!(arena.expr(tail).kind, ExprKind::Int(42)));
}

#[test]
fn test_let_statement_with_annotation() {
    let (root, arena) = parse_expr_source("{ let x: i64 = 1; x }");
    let ExprKind::Block { stmts, .. } = &arena.expr(root).kind else {
        panic!("expected block");
    };
    let StmtKind::Let { arms, terminal } = &arena.stmt(stmts[0]).kind else {
        panic!("expected let statement");
    };
    assert_eq!(arms.len(), 1);
    assert!(terminal.is_none());
    // The annotation binds to the pattern.
    assert!(matches!(
        &arena.pattern(arms[0].pattern).kind,
        PatternKind::Binding { ty: Some(_), .. }
    ));
}

#[test]
fn test_let_else_chain_statement() {
    let (root, arena) =
        parse_expr_source("{ let Some(x) = a else Some(x) = b else { return; }; x }");
    let ExprKind::Block { stmts, .. } = &arena.expr(root).kind else {
        panic!("expected block");
    };
    let StmtKind::Let { arms, terminal } = &arena.stmt(stmts[0]).kind else {
        panic!("expected let statement");
    };
    assert_eq!(arms.len(), 2);
    assert!(terminal.is_some());
}

#[test]
fn test_tuple_pattern_with_annotations() {
    let (root, arena) = parse_expr_source("{ let (a: i32, mut b) = p; a }");
    let ExprKind::Block { stmts, .. } = &arena.expr(root).kind else {
        panic!("expected block");
    };
    let StmtKind::Let { arms, .. } = &arena.stmt(stmts[0]).kind else {
        panic!("expected let statement");
    };
    let PatternKind::Tuple(subs) = &arena.pattern(arms[0].pattern).kind else {
        panic!("expected tuple pattern");
    };
    assert_eq!(subs.len(), 2);
    assert!(matches!(
        &arena.pattern(subs[0]).kind,
        PatternKind::Binding { ty: Some(_), mutable: false, .. }
    ));
    assert!(matches!(
        &arena.pattern(subs[1]).kind,
        PatternKind::Binding { ty: None, mutable: true, .. }
    ));
}

#[test]
fn test_unit_declarations() {
    let result = parse_unit_source(
        "newtype Meters = f64;\n\
         subtype Fast = Meters;\n\
         struct Point { x: f32, y: f32 }\n\
         tuple Pair = (i32, i32);\n\
         enum Color { Red = 0, Green = 1 }\n\
         sum Shape { Circle(f64) | Dot }\n\
         union Raw { bits: u32, float: f32 }\n\
         fn area(p: Point) -> f32 { p.x * p.y }\n",
    );
    assert!(!result.has_errors(), "errors: {:?}", result.errors);
    assert_eq!(result.unit.decls.len(), 8);
    assert!(matches!(result.unit.decls[0].kind, DeclKind::Newtype { .. }));
    assert!(matches!(result.unit.decls[1].kind, DeclKind::Subtype { .. }));
    let DeclKind::Sum { variants, .. } = &result.unit.decls[5].kind else {
        panic!("expected sum declaration");
    };
    assert_eq!(variants.len(), 2);
    assert!(variants[0].payload.is_some());
    assert!(variants[1].payload.is_none());
}

#[test]
fn test_unit_error_recovery() {
    // The bad declaration is reported and the following one still parses.
    let result = parse_unit_source("struct Broken { oops }\nfn ok() { 1 }");
    assert!(result.has_errors());
    assert_eq!(result.unit.decls.len(), 1);
    assert!(matches!(result.unit.decls[0].kind, DeclKind::Fn(_)));
}

#[test]
fn test_fn_with_generics_and_nested_generic_type() {
    let result = parse_unit_source("fn f<T, U>(x: List<List<i32>>) -> T { x }");
    assert!(!result.has_errors(), "errors: {:?}", result.errors);
    let DeclKind::Fn(f) = &result.unit.decls[0].kind else {
        panic!("expected fn");
    };
    assert_eq!(f.generics.len(), 2);
    let ParsedType::Named { args, .. } = &f.params[0].1 else {
        panic!("expected named type");
    };
    assert_eq!(args.len(), 1);
}

#[test]
fn test_while_let_condition() {
    let (root, arena) = parse_expr_source("while let Some(x) = next() { f(x) }");
    let ExprKind::While { cond, .. } = &arena.expr(root).kind else {
        panic!("expected while");
    };
    assert!(matches!(arena.expr(*cond).kind, ExprKind::LetCond { .. }));
}

#[test]
fn test_pointer_and_array_types() {
    let result = parse_unit_source("fn f(a: *u8, b: [u8; 16], c: [i32], d: rawptr) { 0 }");
    assert!(!result.has_errors(), "errors: {:?}", result.errors);
    let DeclKind::Fn(f) = &result.unit.decls[0].kind else {
        panic!("expected fn");
    };
    assert!(matches!(f.params[0].1, ParsedType::Ptr(_)));
    assert!(matches!(f.params[1].1, ParsedType::Array { len: 16, .. }));
    assert!(matches!(f.params[2].1, ParsedType::Slice(_)));
    assert!(matches!(f.params[3].1, ParsedType::RawPtr));
}
