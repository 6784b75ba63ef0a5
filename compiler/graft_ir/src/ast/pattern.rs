//! Match patterns.

use crate::{ExprId, Name, ParsedType, PatternId, Span, Spanned};

/// A pattern with its source span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Pattern { kind, span }
    }
}

impl Spanned for Pattern {
    fn span(&self) -> Span {
        self.span
    }
}

/// Pattern variants.
///
/// Binding names within one pattern are unique; the pattern resolver
/// enforces this during elaboration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PatternKind {
    /// `_`
    Wildcard,

    /// Literal pattern: `42`, `'a'`, `true`, `"s"`. The literal is an
    /// arena expression so negative literals reuse expression parsing.
    Literal(ExprId),

    /// Binding: `x`, `mut x`, `x: i64`. An annotation is unified against
    /// the type structural decomposition infers for this position.
    Binding {
        name: Name,
        ty: Option<ParsedType>,
        mutable: bool,
    },

    /// Tuple pattern: `(a, b)`.
    Tuple(Vec<PatternId>),

    /// Struct pattern: `Point { x, y: b }`.
    Struct {
        name: Name,
        fields: Vec<(Name, PatternId)>,
    },

    /// Sum/enum case pattern: `Some(p)`, `None`.
    Variant {
        name: Name,
        payload: Option<PatternId>,
    },

    /// Range pattern: `1..10`, `'a'..='z'`, `..5`, `3..`.
    Range {
        start: Option<ExprId>,
        end: Option<ExprId>,
        inclusive: bool,
    },
}
