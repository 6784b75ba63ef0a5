//! Pattern and binding resolution for the Graft compiler.
//!
//! The resolver elaborates pattern ASTs against value types:
//!
//! - [`elaborate_match`] — one pattern against one scrutinee type,
//!   producing [`MatchOutcome::Bound`] with typed bindings or
//!   [`MatchOutcome::Unmatched`] when no value can ever match. Match
//!   failure is data, never an error.
//! - [`elaborate_let_chain`] — `let` statements and `let-else` chains,
//!   including the divergence requirement on the terminal block.
//! - [`lower_condition`] / [`elaborate_fallback`] — conjunctive `if let`
//!   conditions with left-to-right binding visibility, and value
//!   fallbacks (`if let P = E else F`).
//!
//! Binding scopes produced here are ephemeral: they live exactly as long
//! as the elaboration of the construct that owns them, then merge into the
//! caller's lexical scope.

mod chains;
mod conditions;
mod diverge;
mod elaborate;
mod error;
mod outcome;

#[cfg(test)]
mod test_support;

pub use chains::{elaborate_fallback, elaborate_let_chain};
pub use conditions::{lower_condition, CondClause};
pub use diverge::check_diverges;
pub use elaborate::{elaborate_match, PatternCx};
pub use error::PatternError;
pub use outcome::{Binding, BindingSet, MatchOutcome};
