//! Cast legality resolution.
//!
//! Classifies a requested cast against the four-tier operator ladder:
//! reliable `#`, integer-family `$`, unreliable `#?`, unsafe `#~`, and
//! `bitcast`. Numeric and pointer rules apply to the *structural* shape of
//! the operands (a newtype of `i8` widens like `i8`); parallel and
//! upstream/downstream rules apply to the declared identity.

use thiserror::Error;

use graft_ir::CastOp;

use crate::forest::SealedForest;
use crate::pool::TypePool;
use crate::ty::{Type, TypeId};

/// A fully resolved cast, attached to the cast expression for codegen.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CastNode {
    pub source: TypeId,
    pub dest: TypeId,
    /// The operator as written.
    pub op: CastOp,
    pub kind: CastKind,
}

/// Resolved cast classification.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CastKind {
    /// Compile-time guaranteed; no run-time component.
    Reliable,
    /// Integer conversion: truncation / sign-extension / zero-extension
    /// per destination width and signedness. Total; never checked.
    IntegerFamily,
    /// Run-time checked; yields a success/failure outcome at run time.
    Unreliable,
    /// Unchecked; an invalid value is undefined behavior.
    Unsafe,
    /// Representation reinterpretation between equal-width types.
    Bit,
}

/// Cast resolution failures. All are compile-time; the run-time failure of
/// an unreliable cast is a data outcome, not an error.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum CastError {
    #[error("no reliable cast between these types")]
    NoReliableCast {
        src: TypeId,
        dest: TypeId,
        /// An operator that would make this cast legal, if one exists.
        suggestion: Option<CastOp>,
    },

    #[error("cast operator `{}` does not apply to these operands", op.as_symbol())]
    InvalidOperand {
        op: CastOp,
        src: TypeId,
        dest: TypeId,
    },

    #[error("cast destination cannot be inferred; annotate the target type")]
    UnresolvedCastTarget { op: CastOp },

    #[error("bit cast requires identical bit widths ({src_bits} vs {dst_bits})")]
    WidthMismatch {
        src: TypeId,
        dest: TypeId,
        src_bits: u64,
        dst_bits: u64,
    },
}

/// Resolve a cast request into a classified [`CastNode`].
///
/// `dest` is `None` when the surface omitted the destination and context
/// could not supply one; that is [`CastError::UnresolvedCastTarget`].
pub fn resolve_cast(
    source: TypeId,
    dest: Option<TypeId>,
    op: CastOp,
    forest: &SealedForest,
    pool: &TypePool,
) -> Result<CastNode, CastError> {
    let Some(dest) = dest else {
        return Err(CastError::UnresolvedCastTarget { op });
    };

    let cx = CastCx {
        forest,
        pool,
        source,
        dest,
    };

    let kind = match op {
        CastOp::Reliable => {
            if cx.reliable_ok() {
                CastKind::Reliable
            } else {
                return Err(CastError::NoReliableCast {
                    src: source,
                    dest,
                    suggestion: cx.suggest_operator(),
                });
            }
        }
        CastOp::Integer => {
            if cx.integer_family_ok() {
                CastKind::IntegerFamily
            } else {
                return Err(CastError::InvalidOperand { op, src: source, dest });
            }
        }
        CastOp::Unreliable => {
            if cx.unreliable_ok() {
                CastKind::Unreliable
            } else {
                return Err(CastError::InvalidOperand { op, src: source, dest });
            }
        }
        CastOp::Unsafe => {
            if cx.unsafe_ok() {
                CastKind::Unsafe
            } else {
                return Err(CastError::InvalidOperand { op, src: source, dest });
            }
        }
        CastOp::Bit => {
            let src_bits = cx.bit_width(source);
            let dst_bits = cx.bit_width(dest);
            match (src_bits, dst_bits) {
                (Some(s), Some(d)) if s == d => CastKind::Bit,
                (Some(s), Some(d)) => {
                    return Err(CastError::WidthMismatch {
                        src: source,
                        dest,
                        src_bits: s,
                        dst_bits: d,
                    })
                }
                // Unsized operands (slices) have no bit width.
                _ => return Err(CastError::InvalidOperand { op, src: source, dest }),
            }
        }
    };

    Ok(CastNode {
        source,
        dest,
        op,
        kind,
    })
}

struct CastCx<'a> {
    forest: &'a SealedForest,
    pool: &'a TypePool,
    source: TypeId,
    dest: TypeId,
}

impl CastCx<'_> {
    fn shape(&self, ty: TypeId) -> Type {
        let structural = self.forest.structural_of(ty, self.pool);
        self.pool.get(structural)
    }

    /// `#`: widening int with unchanged signedness, widening float, any
    /// pointer to `rawptr`, parallel types, or a move toward the tree root.
    fn reliable_ok(&self) -> bool {
        if self.forest.are_parallel(self.source, self.dest, self.pool)
            || self.forest.is_upstream_of(self.dest, self.source, self.pool)
        {
            return true;
        }

        let src = self.shape(self.source);
        let dst = self.shape(self.dest);
        match (&src, &dst) {
            (
                Type::Int {
                    width: sw,
                    signed: ss,
                },
                Type::Int {
                    width: dw,
                    signed: ds,
                },
            ) => ss == ds && dw > sw,
            (Type::Float { width: sw }, Type::Float { width: dw }) => dw > sw,
            _ => src.is_pointer() && matches!(dst, Type::RawPtr),
        }
    }

    /// `$`: total over integer operands, regardless of width or sign.
    fn integer_family_ok(&self) -> bool {
        self.shape(self.source).is_integer() && self.shape(self.dest).is_integer()
    }

    /// `#?`: integer conversions that are not reliable widenings
    /// (narrowing or signedness change), and 32-bit integer to `char`.
    fn unreliable_ok(&self) -> bool {
        let src = self.shape(self.source);
        let dst = self.shape(self.dest);
        match (&src, &dst) {
            (
                Type::Int {
                    width: sw,
                    signed: ss,
                },
                Type::Int {
                    width: dw,
                    signed: ds,
                },
            ) => dw < sw || ss != ds,
            (Type::Int { width, .. }, Type::Char) => width.bits() == 32,
            _ => false,
        }
    }

    /// `#~`: opaque pointer to concrete pointer, a move away from the tree
    /// root, or any unreliable-legal case with the check skipped.
    fn unsafe_ok(&self) -> bool {
        if self.forest.is_downstream_of(self.dest, self.source, self.pool) {
            return true;
        }
        let src = self.shape(self.source);
        let dst = self.shape(self.dest);
        if matches!(src, Type::RawPtr) && matches!(dst, Type::Ptr(_)) {
            return true;
        }
        self.unreliable_ok()
    }

    /// Operator to suggest alongside `NoReliableCast`.
    fn suggest_operator(&self) -> Option<CastOp> {
        if self.unreliable_ok() {
            Some(CastOp::Unreliable)
        } else if self.unsafe_ok() {
            Some(CastOp::Unsafe)
        } else if self.integer_family_ok() {
            Some(CastOp::Integer)
        } else {
            None
        }
    }

    /// Run-time bit width of a type, `None` for unsized types.
    ///
    /// Widths use the packed model: aggregates are the sum of their parts,
    /// unions the max member, enums a 32-bit tag, sums a 32-bit tag plus
    /// the widest payload.
    fn bit_width(&self, ty: TypeId) -> Option<u64> {
        let shape = self.shape(ty);
        match shape {
            Type::Int { width, .. } => Some(width.bits()),
            Type::Float { width } => Some(width.bits()),
            Type::Bool => Some(8),
            Type::Char => Some(32),
            Type::Unit => Some(0),
            Type::Ptr(_) | Type::RawPtr => Some(64),
            Type::Array { elem, len } => Some(self.bit_width(elem)? * len),
            Type::Slice(_) => None,
            Type::Struct(fields) => fields
                .iter()
                .map(|&(_, ty)| self.bit_width(ty))
                .sum::<Option<u64>>(),
            Type::Tuple(elems) => elems
                .iter()
                .map(|&ty| self.bit_width(ty))
                .sum::<Option<u64>>(),
            Type::Union(fields) => fields
                .iter()
                .map(|&(_, ty)| self.bit_width(ty))
                .try_fold(0u64, |acc, w| Some(acc.max(w?))),
            Type::Enum(_) => Some(32),
            Type::Sum(variants) => {
                let payload = variants
                    .iter()
                    .map(|(_, payload)| match payload {
                        Some(ty) => self.bit_width(*ty),
                        None => Some(0),
                    })
                    .try_fold(0u64, |acc, w| Some(acc.max(w?)))?;
                Some(32 + payload)
            }
            // structural_of already resolved named types and
            // instantiations; parameters stay opaque.
            Type::Named { .. } | Type::Instance { .. } | Type::Param(_) => None,
        }
    }
}
