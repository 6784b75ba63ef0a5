//! Core diagnostic types for structured error reporting.
//!
//! Rendering (terminal colors, source excerpts) is a consumer concern; this
//! crate only defines the structured payload every phase produces.

use crate::ErrorCode;
use graft_ir::Span;
use std::fmt;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A labeled source region attached to a diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
        }
    }
}

/// A suggested fix, e.g. "use `#?` for a checked narrowing cast".
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Suggestion {
    pub message: String,
    /// Replacement text when the fix is a direct substitution.
    pub replacement: Option<(Span, String)>,
}

impl Suggestion {
    /// Text-only suggestion.
    pub fn text(message: impl Into<String>) -> Self {
        Suggestion {
            message: message.into(),
            replacement: None,
        }
    }

    /// Suggestion with an exact code substitution.
    pub fn replace(message: impl Into<String>, span: Span, snippet: impl Into<String>) -> Self {
        Suggestion {
            message: message.into(),
            replacement: Some((span, snippet.into())),
        }
    }
}

/// A structured diagnostic: code, message, labeled spans, suggestions.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub labels: Vec<Label>,
    pub suggestions: Vec<Suggestion>,
}

impl Diagnostic {
    /// Start an error diagnostic for `code`.
    pub fn error(code: ErrorCode) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code,
            message: code.description().to_owned(),
            labels: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Start a warning diagnostic for `code`.
    pub fn warning(code: ErrorCode) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            code,
            message: code.description().to_owned(),
            labels: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    /// The primary span: the first label's span, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.first().map(|l| l.span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        for label in &self.labels {
            write!(f, "\n  --> {}: {}", label.span, label.message)?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  help: {}", suggestion.message)?;
        }
        Ok(())
    }
}
