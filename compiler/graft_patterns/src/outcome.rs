//! Match outcomes and binding sets.

use graft_ir::{Name, Span};
use graft_types::TypeId;
use smallvec::SmallVec;

use crate::PatternError;

/// One name bound by a successful match.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Binding {
    pub name: Name,
    pub ty: TypeId,
    pub mutable: bool,
    pub span: Span,
}

/// The bindings a pattern produces, plus whether the match can fail at
/// run time.
///
/// The set lives only as long as the elaboration of the construct that
/// produced it; successful elaboration hands the bindings to the enclosing
/// lexical scope.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct BindingSet {
    bindings: SmallVec<[Binding; 4]>,
    refutable: bool,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding, rejecting duplicates within one pattern.
    pub fn insert(&mut self, binding: Binding) -> Result<(), PatternError> {
        if self.bindings.iter().any(|b| b.name == binding.name) {
            return Err(PatternError::DuplicateBinding {
                name: binding.name,
                span: binding.span,
            });
        }
        self.bindings.push(binding);
        Ok(())
    }

    /// Absorb the bindings and refutability of a sub-pattern.
    pub fn absorb(&mut self, other: BindingSet) -> Result<(), PatternError> {
        for binding in other.bindings {
            self.insert(binding)?;
        }
        self.refutable |= other.refutable;
        Ok(())
    }

    pub fn mark_refutable(&mut self) {
        self.refutable = true;
    }

    /// Whether the owning pattern can fail to match at run time.
    pub fn is_refutable(&self) -> bool {
        self.refutable
    }

    pub fn get(&self, name: Name) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// The result of attempting a match: either a set of typed bindings or the
/// statically visible knowledge that no value of the source type matches.
///
/// `Unmatched` is a data outcome, never an error; `let-else`, conjunctive
/// `if let`, and value fallbacks all consume it as ordinary control data.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum MatchOutcome {
    Bound(BindingSet),
    Unmatched,
}

impl MatchOutcome {
    pub fn is_unmatched(&self) -> bool {
        matches!(self, MatchOutcome::Unmatched)
    }

    pub fn bindings(&self) -> Option<&BindingSet> {
        match self {
            MatchOutcome::Bound(set) => Some(set),
            MatchOutcome::Unmatched => None,
        }
    }
}
