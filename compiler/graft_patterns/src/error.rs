//! Pattern elaboration errors.
//!
//! Match *failure* is not an error: `Unmatched` is routed as data through
//! the surface constructs. Errors here are structural problems the program
//! cannot recover from at run time.

use graft_diagnostic::{Diagnostic, ErrorCode, Suggestion};
use graft_ir::{Name, Span};
use graft_types::TypeId;
use thiserror::Error;

/// Errors raised while elaborating patterns and binding constructs.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum PatternError {
    #[error("refutable pattern in `let` without an `else` continuation")]
    RefutableWithoutElse { span: Span },

    #[error("pattern annotation conflicts with the decomposed type")]
    AnnotationMismatch {
        span: Span,
        expected: TypeId,
        found: TypeId,
    },

    #[error("`let-else` terminal block can fall through")]
    Fallthrough {
        /// The reachable fallthrough path inside the terminal block.
        span: Span,
    },

    #[error("binding `{name:?}` appears more than once in this pattern")]
    DuplicateBinding { name: Name, span: Span },

    #[error("`||` is not allowed inside a let-condition")]
    AmbiguousBindingUnion { span: Span },

    #[error("{message}")]
    ShapeMismatch { span: Span, message: String },
}

impl PatternError {
    pub fn span(&self) -> Span {
        match self {
            PatternError::RefutableWithoutElse { span }
            | PatternError::AnnotationMismatch { span, .. }
            | PatternError::Fallthrough { span }
            | PatternError::DuplicateBinding { span, .. }
            | PatternError::AmbiguousBindingUnion { span }
            | PatternError::ShapeMismatch { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PatternError::RefutableWithoutElse { .. } => ErrorCode::E3001,
            PatternError::AnnotationMismatch { .. } => ErrorCode::E3002,
            PatternError::Fallthrough { .. } => ErrorCode::E3003,
            PatternError::DuplicateBinding { .. } => ErrorCode::E3004,
            PatternError::AmbiguousBindingUnion { .. } => ErrorCode::E3005,
            PatternError::ShapeMismatch { .. } => ErrorCode::E3006,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(self.span(), label_for(self));
        match self {
            PatternError::RefutableWithoutElse { .. } => diag.with_suggestion(Suggestion::text(
                "add an `else` continuation or match a wildcard",
            )),
            PatternError::AmbiguousBindingUnion { .. } => diag.with_suggestion(Suggestion::text(
                "a binding produced by only one disjunct has no single type; \
                 split the condition into separate `if let` branches",
            )),
            PatternError::Fallthrough { .. } => diag.with_suggestion(Suggestion::text(
                "exit with `return`, `break`, or `continue`",
            )),
            _ => diag,
        }
    }
}

fn label_for(err: &PatternError) -> &'static str {
    match err {
        PatternError::RefutableWithoutElse { .. } => "this pattern can fail to match",
        PatternError::AnnotationMismatch { .. } => "annotation conflicts here",
        PatternError::Fallthrough { .. } => "this path falls through",
        PatternError::DuplicateBinding { .. } => "rebound here",
        PatternError::AmbiguousBindingUnion { .. } => "disjunction in let-condition",
        PatternError::ShapeMismatch { .. } => "pattern does not fit",
    }
}
