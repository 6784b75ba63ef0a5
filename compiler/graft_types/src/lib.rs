//! Type system for the Graft compiler.
//!
//! Two tightly coupled pieces live here:
//!
//! - The **type-relation engine** ([`TypeForest`] / [`SealedForest`]): the
//!   forest of type sets built during declaration collection. Sealing the
//!   forest precomputes ancestor tables, after which `are_parallel`,
//!   `is_upstream_of`, and `is_downstream_of` are O(1) and may be queried
//!   concurrently without locks.
//! - The **cast resolver** ([`resolve_cast`]): classifies a requested cast
//!   operator against the relation engine and the structural shapes of the
//!   operands.
//!
//! Types themselves are interned in a [`TypePool`]; the pool remains
//! internable during elaboration (for pointer and instantiation types built
//! on demand) while the forest is strictly append-only before sealing and
//! read-only after.

mod cast;
mod forest;
mod pool;
mod resolve;
mod ty;

pub use cast::{resolve_cast, CastError, CastKind, CastNode};
pub use forest::{DeclareError, SealedForest, TypeForest, TypeSetId};
pub use pool::TypePool;
pub use resolve::{resolve_parsed_type, Primitives, ResolveError, TypeLookup};
pub use ty::{FloatWidth, GenArg, IntWidth, Type, TypeId};
