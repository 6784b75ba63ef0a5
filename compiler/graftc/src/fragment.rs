//! Re-entrant parse/elaborate entry point for the macro expander.
//!
//! A macro expansion hands back a token fragment plus the lexical scope
//! it expands in; the fragment is parsed and elaborated like any
//! expression. Errors must surface attributing both the macro definition
//! site (the span inside the fragment) and the invocation site.

use graft_diagnostic::DiagnosticQueue;
use graft_ir::{ExprArena, ExprId, Name, Span, StringInterner, TokenList};
use graft_types::{CastNode, Primitives, TypeId, TypePool};
use rustc_hash::FxHashMap;

use crate::collect::Declarations;
use crate::elaborate::Elaborator;

/// The lexical context a fragment expands in.
pub struct FragmentScope<'a> {
    /// Bindings visible at the expansion site.
    pub bindings: &'a [(Name, TypeId)],
    /// The macro being expanded, for error attribution.
    pub macro_name: Name,
    /// The call site in the invoking source.
    pub invocation_span: Span,
}

/// A successfully elaborated fragment: the AST and its types, spliced
/// back by the expander.
#[derive(Debug)]
pub struct ElaboratedFragment {
    pub expr: ExprId,
    pub arena: ExprArena,
    pub ty: TypeId,
    pub expr_types: FxHashMap<ExprId, TypeId>,
    pub casts: FxHashMap<ExprId, CastNode>,
}

/// An error inside a macro expansion, attributing both the definition
/// and the invocation site.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MacroExpandError {
    pub message: String,
    /// Location within the expanded fragment (macro definition side).
    pub span: Span,
    pub macro_name: Name,
    /// Location of the invocation in the calling source.
    pub invocation_span: Span,
}

impl MacroExpandError {
    fn new(message: String, span: Span, scope: &FragmentScope<'_>) -> Self {
        MacroExpandError {
            message,
            span,
            macro_name: scope.macro_name,
            invocation_span: scope.invocation_span,
        }
    }
}

impl std::fmt::Display for MacroExpandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (in expansion at {}, invoked at {})",
            self.message, self.span, self.invocation_span
        )
    }
}

impl std::error::Error for MacroExpandError {}

/// Parse and elaborate a token fragment in the given scope.
///
/// Requires the sealed declarations: macro expansion happens during
/// elaboration, after the declaration-collection barrier.
pub fn elaborate_fragment(
    tokens: &TokenList,
    scope: &FragmentScope<'_>,
    decls: &Declarations,
    pool: &TypePool,
    interner: &StringInterner,
    primitives: &Primitives,
) -> Result<ElaboratedFragment, MacroExpandError> {
    let (expr, arena) = graft_parse::parse_expression(tokens, interner)
        .map_err(|err| MacroExpandError::new(err.message.clone(), err.span, scope))?;

    let mut queue = DiagnosticQueue::new();
    let elaborator = Elaborator::new(decls, pool, interner, primitives, &arena, &mut queue)
        .with_bindings(scope.bindings);
    let (typed, ty) = elaborator.elaborate_expr(expr);

    if let Some(diag) = queue.iter().next() {
        let span = diag.primary_span().unwrap_or(Span::DUMMY);
        return Err(MacroExpandError::new(diag.message.clone(), span, scope));
    }

    Ok(ElaboratedFragment {
        expr,
        arena,
        ty,
        expr_types: typed.expr_types,
        casts: typed.casts,
    })
}
