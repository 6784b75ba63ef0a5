//! Pattern elaboration against value types.
//!
//! `elaborate_match` unifies a pattern with the type of its scrutinee,
//! producing the typed bindings the pattern introduces, the refutability of
//! the match, or the statically visible outcome `Unmatched` when no value
//! of the source type can ever match (e.g. an empty range pattern).
//!
//! Elaboration returns a tagged value rather than signaling failure
//! non-locally: `Unmatched` is consumed as ordinary data by `let-else`
//! chains, conjunctive conditions, and value fallbacks.

use graft_ir::{
    ExprArena, ExprId, ExprKind, Name, ParsedType, ParsedTypeArg, PatternId, PatternKind, Span,
    StringInterner, UnaryOp,
};
use graft_types::{
    resolve_parsed_type, Primitives, SealedForest, Type, TypeId, TypePool,
};
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::{Binding, BindingSet, MatchOutcome, PatternError};

/// Everything pattern elaboration needs to read. All references point at
/// sealed, phase-immutable state, so a `PatternCx` is freely shareable
/// across elaboration workers.
pub struct PatternCx<'a> {
    pub arena: &'a ExprArena,
    pub interner: &'a StringInterner,
    pub forest: &'a SealedForest,
    pub pool: &'a TypePool,
    pub primitives: &'a Primitives,
}

impl PatternCx<'_> {
    pub(crate) fn shape(&self, ty: TypeId) -> Type {
        self.pool.get(self.forest.structural_of(ty, self.pool))
    }

    /// Two types unify when they are identical or parallel.
    pub(crate) fn unify(&self, a: TypeId, b: TypeId) -> bool {
        self.forest.are_parallel(a, b, self.pool)
    }

    pub(crate) fn resolve_annotation(
        &self,
        parsed: &ParsedType,
        span: Span,
    ) -> Result<TypeId, PatternError> {
        resolve_parsed_type(
            parsed,
            self.forest,
            self.primitives,
            self.pool,
            self.interner,
            &const_int_literal_arg(self.arena),
        )
        .map_err(|err| PatternError::ShapeMismatch {
            span,
            message: err.to_string(),
        })
    }
}

/// Const-argument evaluator for annotations inside patterns: integer
/// literals only.
fn const_int_literal_arg(arena: &ExprArena) -> impl Fn(&ParsedTypeArg) -> Option<i64> + '_ {
    move |arg| match arg {
        ParsedTypeArg::Const(expr) => match literal_value(arena, *expr)? {
            LitVal::Int(v) => Some(v),
            _ => None,
        },
        ParsedTypeArg::Type(_) => None,
    }
}

/// Elaborate `pattern` against a scrutinee of type `source`.
pub fn elaborate_match(
    cx: &PatternCx<'_>,
    pattern: PatternId,
    source: TypeId,
) -> Result<MatchOutcome, PatternError> {
    trace!(?pattern, ?source, "elaborate match");
    let node = cx.arena.pattern(pattern);
    let span = node.span;

    match &node.kind {
        PatternKind::Wildcard => Ok(MatchOutcome::Bound(BindingSet::new())),

        PatternKind::Binding { name, ty, mutable } => {
            let bound_ty = match ty {
                Some(annotation) => {
                    let annotated = cx.resolve_annotation(annotation, span)?;
                    if !cx.unify(annotated, source) {
                        return Err(PatternError::AnnotationMismatch {
                            span,
                            expected: source,
                            found: annotated,
                        });
                    }
                    annotated
                }
                None => source,
            };
            let mut set = BindingSet::new();
            set.insert(Binding {
                name: *name,
                ty: bound_ty,
                mutable: *mutable,
                span,
            })?;
            Ok(MatchOutcome::Bound(set))
        }

        PatternKind::Literal(expr) => elaborate_literal(cx, *expr, source, span),

        PatternKind::Tuple(subs) => {
            let Type::Tuple(elems) = cx.shape(source) else {
                return Err(PatternError::ShapeMismatch {
                    span,
                    message: "tuple pattern against a non-tuple type".to_owned(),
                });
            };
            if elems.len() != subs.len() {
                return Err(PatternError::ShapeMismatch {
                    span,
                    message: format!(
                        "tuple pattern has {} elements but the type has {}",
                        subs.len(),
                        elems.len()
                    ),
                });
            }
            let mut set = BindingSet::new();
            for (&sub, &elem_ty) in subs.iter().zip(elems.iter()) {
                match elaborate_match(cx, sub, elem_ty)? {
                    MatchOutcome::Bound(sub_set) => set.absorb(sub_set)?,
                    MatchOutcome::Unmatched => return Ok(MatchOutcome::Unmatched),
                }
            }
            Ok(MatchOutcome::Bound(set))
        }

        PatternKind::Struct { name, fields } => {
            // The pattern names a type; it must agree with the scrutinee.
            if let Some(named) = cx.forest.lookup(*name) {
                if !cx.unify(named, source) {
                    return Err(PatternError::AnnotationMismatch {
                        span,
                        expected: source,
                        found: named,
                    });
                }
            } else {
                return Err(PatternError::ShapeMismatch {
                    span,
                    message: format!("unknown type `{}`", cx.interner.lookup(*name)),
                });
            }

            let Type::Struct(decl_fields) = cx.shape(source) else {
                return Err(PatternError::ShapeMismatch {
                    span,
                    message: "struct pattern against a non-struct type".to_owned(),
                });
            };

            let mut set = BindingSet::new();
            let mut seen_fields = FxHashSet::default();
            for &(field_name, sub) in fields {
                if !seen_fields.insert(field_name) {
                    return Err(PatternError::ShapeMismatch {
                        span,
                        message: format!(
                            "field `{}` matched more than once",
                            cx.interner.lookup(field_name)
                        ),
                    });
                }
                let Some(&(_, field_ty)) =
                    decl_fields.iter().find(|&&(n, _)| n == field_name)
                else {
                    return Err(PatternError::ShapeMismatch {
                        span,
                        message: format!(
                            "type has no field `{}`",
                            cx.interner.lookup(field_name)
                        ),
                    });
                };
                match elaborate_match(cx, sub, field_ty)? {
                    MatchOutcome::Bound(sub_set) => set.absorb(sub_set)?,
                    MatchOutcome::Unmatched => return Ok(MatchOutcome::Unmatched),
                }
            }
            Ok(MatchOutcome::Bound(set))
        }

        PatternKind::Variant { name, payload } => {
            elaborate_variant(cx, *name, *payload, source, span)
        }

        PatternKind::Range {
            start,
            end,
            inclusive,
        } => elaborate_range(cx, *start, *end, *inclusive, source, span),
    }
}

fn elaborate_literal(
    cx: &PatternCx<'_>,
    expr: ExprId,
    source: TypeId,
    span: Span,
) -> Result<MatchOutcome, PatternError> {
    let Some(value) = literal_value(cx.arena, expr) else {
        return Err(PatternError::ShapeMismatch {
            span,
            message: "literal pattern must be a constant".to_owned(),
        });
    };

    let shape = cx.shape(source);
    let fits = match (&value, &shape) {
        (LitVal::Int(_), Type::Int { .. }) => true,
        (LitVal::Float(_), Type::Float { .. }) => true,
        (LitVal::Bool(_), Type::Bool) => true,
        (LitVal::Char(_), Type::Char) => true,
        (LitVal::Str(_), Type::Slice(elem)) => {
            matches!(cx.shape(*elem), Type::Int { signed: false, .. })
        }
        _ => false,
    };
    if !fits {
        return Err(PatternError::ShapeMismatch {
            span,
            message: "literal pattern does not fit the scrutinee type".to_owned(),
        });
    }

    let mut set = BindingSet::new();
    set.mark_refutable();
    Ok(MatchOutcome::Bound(set))
}

fn elaborate_variant(
    cx: &PatternCx<'_>,
    name: Name,
    payload: Option<PatternId>,
    source: TypeId,
    span: Span,
) -> Result<MatchOutcome, PatternError> {
    match cx.shape(source) {
        Type::Sum(variants) => {
            let Some((_, decl_payload)) = variants.iter().find(|(n, _)| *n == name) else {
                return Err(PatternError::ShapeMismatch {
                    span,
                    message: format!(
                        "type has no variant `{}`",
                        cx.interner.lookup(name)
                    ),
                });
            };

            let mut set = BindingSet::new();
            match (payload, decl_payload) {
                (Some(sub), Some(payload_ty)) => {
                    match elaborate_match(cx, sub, *payload_ty)? {
                        MatchOutcome::Bound(sub_set) => set.absorb(sub_set)?,
                        MatchOutcome::Unmatched => return Ok(MatchOutcome::Unmatched),
                    }
                }
                (None, None) => {}
                (Some(_), None) => {
                    return Err(PatternError::ShapeMismatch {
                        span,
                        message: format!(
                            "variant `{}` carries no payload",
                            cx.interner.lookup(name)
                        ),
                    })
                }
                (None, Some(_)) => {
                    return Err(PatternError::ShapeMismatch {
                        span,
                        message: format!(
                            "variant `{}` requires a payload pattern",
                            cx.interner.lookup(name)
                        ),
                    })
                }
            }
            // Matching one of several cases can fail at run time.
            if variants.len() > 1 {
                set.mark_refutable();
            }
            Ok(MatchOutcome::Bound(set))
        }

        Type::Enum(variants) => {
            if !variants.iter().any(|(n, _)| *n == name) {
                return Err(PatternError::ShapeMismatch {
                    span,
                    message: format!(
                        "enum has no variant `{}`",
                        cx.interner.lookup(name)
                    ),
                });
            }
            if payload.is_some() {
                return Err(PatternError::ShapeMismatch {
                    span,
                    message: "enum variants carry no payload".to_owned(),
                });
            }
            let mut set = BindingSet::new();
            if variants.len() > 1 {
                set.mark_refutable();
            }
            Ok(MatchOutcome::Bound(set))
        }

        _ => Err(PatternError::ShapeMismatch {
            span,
            message: "variant pattern against a non-variant type".to_owned(),
        }),
    }
}

fn elaborate_range(
    cx: &PatternCx<'_>,
    start: Option<ExprId>,
    end: Option<ExprId>,
    inclusive: bool,
    source: TypeId,
    span: Span,
) -> Result<MatchOutcome, PatternError> {
    let shape = cx.shape(source);
    let bound_value = |expr: Option<ExprId>| -> Result<Option<i64>, PatternError> {
        let Some(expr) = expr else { return Ok(None) };
        match literal_value(cx.arena, expr) {
            Some(LitVal::Int(v)) if shape.is_integer() => Ok(Some(v)),
            Some(LitVal::Char(c)) if matches!(shape, Type::Char) => Ok(Some(i64::from(c as u32))),
            _ => Err(PatternError::ShapeMismatch {
                span,
                message: "range bounds must be constants of the scrutinee type".to_owned(),
            }),
        }
    };

    if !shape.is_integer() && !matches!(shape, Type::Char) {
        return Err(PatternError::ShapeMismatch {
            span,
            message: "range pattern against a non-ordinal type".to_owned(),
        });
    }

    let lo = bound_value(start)?;
    let hi = bound_value(end)?;

    // A provably empty range matches nothing: a data outcome, not an error.
    if let (Some(lo), Some(hi)) = (lo, hi) {
        let empty = if inclusive { lo > hi } else { lo >= hi };
        if empty {
            return Ok(MatchOutcome::Unmatched);
        }
    }

    let mut set = BindingSet::new();
    set.mark_refutable();
    Ok(MatchOutcome::Bound(set))
}

/// Constant value of a literal pattern expression.
enum LitVal {
    Int(i64),
    Float(u64),
    Bool(bool),
    Char(char),
    Str(Name),
}

fn literal_value(arena: &ExprArena, expr: ExprId) -> Option<LitVal> {
    match &arena.expr(expr).kind {
        ExprKind::Int(v) => Some(LitVal::Int(*v)),
        ExprKind::Float(bits) => Some(LitVal::Float(*bits)),
        ExprKind::Bool(b) => Some(LitVal::Bool(*b)),
        ExprKind::Char(c) => Some(LitVal::Char(*c)),
        ExprKind::Str(name) => Some(LitVal::Str(*name)),
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => match literal_value(arena, *operand)? {
            LitVal::Int(v) => Some(LitVal::Int(-v)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    #[test]
    fn test_wildcard_irrefutable() {
        let mut fx = Fixture::new();
        let pat = fx.pattern(PatternKind::Wildcard);
        let cx = fx.cx();

        let outcome = elaborate_match(&cx, pat, TypePool::I32).unwrap();
        let set = outcome.bindings().unwrap();
        assert!(!set.is_refutable());
        assert!(set.is_empty());
    }

    #[test]
    fn test_binding_takes_source_type() {
        let mut fx = Fixture::new();
        let x = fx.name("x");
        let pat = fx.pattern(PatternKind::Binding {
            name: x,
            ty: None,
            mutable: true,
        });
        let cx = fx.cx();

        let outcome = elaborate_match(&cx, pat, TypePool::I64).unwrap();
        let set = outcome.bindings().unwrap();
        let binding = set.get(x).unwrap();
        assert_eq!(binding.ty, TypePool::I64);
        assert!(binding.mutable);
        assert!(!set.is_refutable());
    }

    #[test]
    fn test_annotation_accepts_parallel_type() {
        let mut fx = Fixture::new();
        // `meters` is a newtype over f64; annotating an f64 position with
        // it is accepted and the binding takes the annotated type.
        let meters = fx.meters;
        let x = fx.name("x");
        let annotation = ParsedType::name(fx.name("Meters"));
        let pat = fx.pattern(PatternKind::Binding {
            name: x,
            ty: Some(annotation),
            mutable: false,
        });
        let cx = fx.cx();

        let outcome = elaborate_match(&cx, pat, TypePool::F64).unwrap();
        assert_eq!(outcome.bindings().unwrap().get(x).unwrap().ty, meters);
    }

    #[test]
    fn test_annotation_mismatch() {
        let mut fx = Fixture::new();
        let x = fx.name("x");
        let annotation = ParsedType::name(fx.name("i32"));
        let pat = fx.pattern(PatternKind::Binding {
            name: x,
            ty: Some(annotation),
            mutable: false,
        });
        let cx = fx.cx();

        let err = elaborate_match(&cx, pat, TypePool::BOOL).unwrap_err();
        assert!(matches!(err, PatternError::AnnotationMismatch { .. }));
    }

    #[test]
    fn test_tuple_decomposition() {
        let mut fx = Fixture::new();
        let a = fx.name("a");
        let b = fx.name("b");
        let pa = fx.pattern(PatternKind::Binding {
            name: a,
            ty: None,
            mutable: false,
        });
        let pb = fx.pattern(PatternKind::Binding {
            name: b,
            ty: None,
            mutable: false,
        });
        let pat = fx.pattern(PatternKind::Tuple(vec![pa, pb]));
        let pair = fx.pool.intern(Type::Tuple(vec![TypePool::I8, TypePool::BOOL]));
        let cx = fx.cx();

        let outcome = elaborate_match(&cx, pat, pair).unwrap();
        let set = outcome.bindings().unwrap();
        assert_eq!(set.get(a).unwrap().ty, TypePool::I8);
        assert_eq!(set.get(b).unwrap().ty, TypePool::BOOL);
    }

    #[test]
    fn test_tuple_arity_mismatch_is_error() {
        let mut fx = Fixture::new();
        let pa = fx.pattern(PatternKind::Wildcard);
        let pat = fx.pattern(PatternKind::Tuple(vec![pa]));
        let pair = fx.pool.intern(Type::Tuple(vec![TypePool::I8, TypePool::BOOL]));
        let cx = fx.cx();

        let err = elaborate_match(&cx, pat, pair).unwrap_err();
        assert!(matches!(err, PatternError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_variant_some_binds_payload() {
        let mut fx = Fixture::new();
        let x = fx.name("x");
        let inner = fx.pattern(PatternKind::Binding {
            name: x,
            ty: None,
            mutable: false,
        });
        let pat = fx.pattern(PatternKind::Variant {
            name: fx.name("Some"),
            payload: Some(inner),
        });
        let option = fx.option_i32;
        let cx = fx.cx();

        let outcome = elaborate_match(&cx, pat, option).unwrap();
        let set = outcome.bindings().unwrap();
        assert_eq!(set.get(x).unwrap().ty, TypePool::I32);
        // Some(...) of a two-case sum is refutable.
        assert!(set.is_refutable());
    }

    #[test]
    fn test_variant_unknown_case_is_error() {
        let mut fx = Fixture::new();
        let pat = fx.pattern(PatternKind::Variant {
            name: fx.name("Missing"),
            payload: None,
        });
        let option = fx.option_i32;
        let cx = fx.cx();

        let err = elaborate_match(&cx, pat, option).unwrap_err();
        assert!(matches!(err, PatternError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_duplicate_binding_across_subpatterns() {
        let mut fx = Fixture::new();
        let x = fx.name("x");
        let p1 = fx.pattern(PatternKind::Binding {
            name: x,
            ty: None,
            mutable: false,
        });
        let p2 = fx.pattern(PatternKind::Binding {
            name: x,
            ty: None,
            mutable: false,
        });
        let pat = fx.pattern(PatternKind::Tuple(vec![p1, p2]));
        let pair = fx.pool.intern(Type::Tuple(vec![TypePool::I8, TypePool::I8]));
        let cx = fx.cx();

        let err = elaborate_match(&cx, pat, pair).unwrap_err();
        assert!(matches!(err, PatternError::DuplicateBinding { .. }));
    }

    #[test]
    fn test_empty_range_is_unmatched_not_error() {
        let mut fx = Fixture::new();
        let lo = fx.expr(ExprKind::Int(10));
        let hi = fx.expr(ExprKind::Int(3));
        let pat = fx.pattern(PatternKind::Range {
            start: Some(lo),
            end: Some(hi),
            inclusive: false,
        });
        let cx = fx.cx();

        let outcome = elaborate_match(&cx, pat, TypePool::I32).unwrap();
        assert!(outcome.is_unmatched());
    }

    #[test]
    fn test_literal_pattern_refutable() {
        let mut fx = Fixture::new();
        let lit = fx.expr(ExprKind::Int(42));
        let pat = fx.pattern(PatternKind::Literal(lit));
        let cx = fx.cx();

        let outcome = elaborate_match(&cx, pat, TypePool::I32).unwrap();
        assert!(outcome.bindings().unwrap().is_refutable());
    }

    #[test]
    fn test_struct_pattern_fields() {
        let mut fx = Fixture::new();
        let x = fx.name("x");
        let px = fx.pattern(PatternKind::Binding {
            name: x,
            ty: None,
            mutable: false,
        });
        let pat = fx.pattern(PatternKind::Struct {
            name: fx.name("Point"),
            fields: vec![(fx.name("x"), px)],
        });
        let point = fx.point;
        let cx = fx.cx();

        let outcome = elaborate_match(&cx, pat, point).unwrap();
        let set = outcome.bindings().unwrap();
        assert_eq!(set.get(x).unwrap().ty, TypePool::F32);
        assert!(!set.is_refutable());
    }
}
