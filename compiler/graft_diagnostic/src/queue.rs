//! Per-unit diagnostic collection.
//!
//! Compile-time errors are fatal to their compilation unit but must not
//! stop elaboration of independent units, so each unit accumulates its
//! diagnostics in a queue and the driver batches them at the end.

use crate::{Diagnostic, Severity};

/// Ordered collection of diagnostics for one compilation unit.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: DiagnosticQueue) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

impl IntoIterator for DiagnosticQueue {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[test]
    fn test_error_counting() {
        let mut queue = DiagnosticQueue::new();
        assert!(!queue.has_errors());

        queue.push(Diagnostic::warning(ErrorCode::E3001));
        assert!(!queue.has_errors());

        queue.push(Diagnostic::error(ErrorCode::E4001));
        assert!(queue.has_errors());
        assert_eq!(queue.error_count(), 1);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_extend_batches_units() {
        let mut all = DiagnosticQueue::new();
        let mut unit = DiagnosticQueue::new();
        unit.push(Diagnostic::error(ErrorCode::E1001));
        all.extend(unit);
        assert_eq!(all.error_count(), 1);
    }
}
