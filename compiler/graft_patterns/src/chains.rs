//! `let`, `let-else` chains, and value-fallback elaboration.
//!
//! A chain attempts its arms left to right at run time; elaboration checks
//! every arm, verifies the surviving scope has one well-defined shape, and
//! enforces the divergence rule on the terminal block.

use graft_ir::{ExprId, LetArm, PatternId, Span};
use graft_types::TypeId;
use tracing::trace;

use crate::diverge::check_diverges;
use crate::elaborate::{elaborate_match, PatternCx};
use crate::{BindingSet, MatchOutcome, PatternError};

/// Elaborate a `let` statement or `let-else` chain.
///
/// `sources` carries the elaborated type of each arm's initializer,
/// parallel to `arms`. Returns the binding scope the statement introduces
/// into the remainder of the enclosing block.
///
/// Rules enforced here:
/// - a refutable chain with no terminal block is `RefutableWithoutElse`;
/// - every arm must bind the same names at unifiable types;
/// - a terminal block that can fall through is `Fallthrough`, citing the
///   reachable path.
pub fn elaborate_let_chain(
    cx: &PatternCx<'_>,
    arms: &[LetArm],
    sources: &[TypeId],
    terminal: Option<ExprId>,
) -> Result<BindingSet, PatternError> {
    debug_assert_eq!(arms.len(), sources.len());
    trace!(arms = arms.len(), "elaborate let chain");

    let mut scope: Option<(BindingSet, Span)> = None;
    let mut provably_bound = false;

    for (arm, &source) in arms.iter().zip(sources.iter()) {
        // A whole-binding annotation participates like a pattern
        // annotation: it must unify with the initializer's type.
        let effective = match &arm.ty {
            Some(annotation) => {
                let annotated = cx.resolve_annotation(annotation, arm.span)?;
                if !cx.unify(annotated, source) {
                    return Err(PatternError::AnnotationMismatch {
                        span: arm.span,
                        expected: source,
                        found: annotated,
                    });
                }
                annotated
            }
            None => source,
        };

        match elaborate_match(cx, arm.pattern, effective)? {
            MatchOutcome::Bound(set) => {
                if !set.is_refutable() {
                    provably_bound = true;
                }
                match &scope {
                    Some((existing, first_span)) => {
                        if !scopes_agree(cx, existing, &set) {
                            return Err(PatternError::ShapeMismatch {
                                span: arm.span,
                                message: format!(
                                    "this arm binds a different scope than the arm at {}",
                                    first_span
                                ),
                            });
                        }
                    }
                    None => scope = Some((set, arm.span)),
                }
            }
            // A provably unmatched arm never contributes bindings.
            MatchOutcome::Unmatched => {}
        }
    }

    if !provably_bound && terminal.is_none() {
        let span = arms.last().map(|arm| arm.span).unwrap_or(Span::DUMMY);
        return Err(PatternError::RefutableWithoutElse { span });
    }

    if let Some(block) = terminal {
        check_diverges(cx.arena, block).map_err(|span| PatternError::Fallthrough { span })?;
    }

    Ok(scope.map(|(set, _)| set).unwrap_or_default())
}

/// Elaborate a value-fallback clause: one pattern attempted against the
/// initializer and then each alternative source in order.
///
/// All sources must decompose under the pattern, and every attempt must
/// produce the same scope. Returns the scope and whether the clause is
/// provably bound (some attempt is irrefutable).
pub fn elaborate_fallback(
    cx: &PatternCx<'_>,
    pattern: PatternId,
    sources: &[TypeId],
    span: Span,
) -> Result<(BindingSet, bool), PatternError> {
    debug_assert!(!sources.is_empty());

    let mut scope: Option<BindingSet> = None;
    let mut provably_bound = false;

    for &source in sources {
        match elaborate_match(cx, pattern, source)? {
            MatchOutcome::Bound(set) => {
                if !set.is_refutable() {
                    provably_bound = true;
                }
                match &scope {
                    Some(existing) => {
                        if !scopes_agree(cx, existing, &set) {
                            return Err(PatternError::ShapeMismatch {
                                span,
                                message:
                                    "fallback sources decompose to different binding types"
                                        .to_owned(),
                            });
                        }
                    }
                    None => scope = Some(set),
                }
            }
            MatchOutcome::Unmatched => {}
        }
    }

    Ok((scope.unwrap_or_default(), provably_bound))
}

/// Two binding scopes agree when they bind the same names at unifiable
/// types.
fn scopes_agree(cx: &PatternCx<'_>, a: &BindingSet, b: &BindingSet) -> bool {
    a.len() == b.len()
        && a.iter().all(|binding| {
            b.get(binding.name)
                .is_some_and(|other| cx.unify(binding.ty, other.ty))
        })
}
