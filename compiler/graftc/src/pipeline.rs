//! The phase pipeline.
//!
//! lex → parse → declaration collection → seal → elaboration.
//!
//! Lexing and parsing are embarrassingly parallel per unit. Declaration
//! collection is single-threaded and must complete for *all* units before
//! any unit elaborates, because upstream/downstream queries need the whole
//! forest; that is the one synchronization barrier. After sealing, the
//! engine is read-only and elaboration fans out per function with no
//! locking.
//!
//! Cancellation is checked at phase boundaries: partial per-unit results
//! are dropped on the floor, and the append-only forest needs no
//! rollback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use graft_diagnostic::DiagnosticQueue;
use graft_ir::{ExprArena, SharedInterner, Unit};
use graft_types::{Primitives, TypePool};
use rayon::prelude::*;
use tracing::{info, info_span};

use crate::collect::{collect_declarations, Declarations};
use crate::elaborate::{Elaborator, TypedFunction};

/// One source file to compile.
#[derive(Clone, Debug)]
pub struct SourceUnit {
    pub name: String,
    pub source: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        SourceUnit {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Cooperative cancellation flag, checked at phase boundaries.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The compile was cancelled at a phase boundary.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("compilation cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Per-unit compile output: batched diagnostics plus the typed functions
/// handed to the (external) code generator.
pub struct UnitOutput {
    pub name: String,
    pub diagnostics: DiagnosticQueue,
    pub typed: Vec<TypedFunction>,
    pub unit: Unit,
    pub arena: ExprArena,
}

/// Whole-compile output.
pub struct CompileOutput {
    pub units: Vec<UnitOutput>,
    pub declarations: Declarations,
    pub pool: TypePool,
    pub interner: SharedInterner,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.units.iter().any(|u| u.diagnostics.has_errors())
    }
}

/// Compile a set of units through all phases.
pub fn compile(units: Vec<SourceUnit>, cancel: &CancelFlag) -> Result<CompileOutput, Cancelled> {
    let span = info_span!("compile", units = units.len());
    let _enter = span.enter();

    let interner = SharedInterner::new();
    let pool = TypePool::new();
    let primitives = Primitives::intern(&interner);

    // Phase 1+2: lex and parse, parallel per unit.
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }
    let parsed: Vec<(String, Unit, ExprArena, DiagnosticQueue)> = units
        .par_iter()
        .map(|unit| {
            let mut queue = DiagnosticQueue::new();
            let lexed = graft_lexer::lex(&unit.source, &interner);
            for err in &lexed.errors {
                queue.push(err.to_diagnostic());
            }
            let result = graft_parse::parse_unit(&lexed.tokens, &interner);
            for err in &result.errors {
                queue.push(err.to_diagnostic());
            }
            (unit.name.clone(), result.unit, result.arena, queue)
        })
        .collect();
    info!("parsed {} units", parsed.len());

    // Phase 3: declaration collection, single-threaded across all units.
    // This is the barrier: no unit elaborates before the forest seals.
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }
    let mut names = Vec::with_capacity(parsed.len());
    let mut asts = Vec::with_capacity(parsed.len());
    let mut queues = Vec::with_capacity(parsed.len());
    for (name, unit, arena, queue) in parsed {
        names.push(name);
        asts.push((unit, arena));
        queues.push(queue);
    }
    let declarations = collect_declarations(&asts, &mut queues, &pool, &interner, &primitives);

    // Phase 4: elaboration, parallel per unit; the sealed engine is
    // queried lock-free.
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }
    let elaborated: Vec<(DiagnosticQueue, Vec<TypedFunction>)> = asts
        .par_iter()
        .map(|(unit, arena)| {
            let mut queue = DiagnosticQueue::new();
            let typed = unit
                .functions()
                .map(|f| {
                    Elaborator::new(
                        &declarations,
                        &pool,
                        &interner,
                        &primitives,
                        arena,
                        &mut queue,
                    )
                    .elaborate_fn(f)
                })
                .collect();
            (queue, typed)
        })
        .collect();

    let mut outputs = Vec::with_capacity(names.len());
    for (((name, (unit, arena)), mut queue), (elab_queue, typed)) in names
        .into_iter()
        .zip(asts)
        .zip(queues)
        .zip(elaborated)
    {
        queue.extend(elab_queue);
        outputs.push(UnitOutput {
            name,
            diagnostics: queue,
            typed,
            unit,
            arena,
        });
    }

    Ok(CompileOutput {
        units: outputs,
        declarations,
        pool,
        interner,
    })
}
