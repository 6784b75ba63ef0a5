//! Diagnostic system for the Graft compiler.
//!
//! Every phase reports problems as a [`Diagnostic`]: an error code, a
//! message, labeled spans, and optional suggestions. Rendering diagnostics
//! to a terminal is a consumer concern and lives outside this workspace.

mod diagnostic;
mod error_code;
mod queue;

pub use diagnostic::{Diagnostic, Label, Severity, Suggestion};
pub use error_code::ErrorCode;
pub use queue::DiagnosticQueue;
