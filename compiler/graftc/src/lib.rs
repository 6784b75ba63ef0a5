//! Graft compiler driver.
//!
//! Wires the phase pipeline together:
//!
//! ```text
//! SourceUnit ─ lex ─ parse ─┐
//! SourceUnit ─ lex ─ parse ─┤  (parallel per unit)
//!                           ▼
//!              declaration collection        (single-threaded barrier)
//!                           ▼
//!                    sealed type forest
//!                           ▼
//!          elaboration (parallel, lock-free reads)
//!                           ▼
//!      typed AST + cast nodes for the code generator
//! ```
//!
//! Also hosts the re-entrant macro fragment entry point and the `graftc`
//! CLI.

pub mod collect;
pub mod elaborate;
pub mod fragment;
pub mod pipeline;

pub use collect::{collect_declarations, Declarations, FnSig};
pub use elaborate::{Elaborator, TypedFunction};
pub use fragment::{elaborate_fragment, ElaboratedFragment, FragmentScope, MacroExpandError};
pub use pipeline::{compile, CancelFlag, Cancelled, CompileOutput, SourceUnit, UnitOutput};
