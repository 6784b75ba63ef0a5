//! Lexer errors.

use graft_diagnostic::{Diagnostic, ErrorCode};
use graft_ir::Span;

/// An error produced while scanning source text.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        LexError {
            message: message.into(),
            span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(ErrorCode::E1001)
            .with_message(&self.message)
            .with_label(self.span, "here")
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

impl std::error::Error for LexError {}
