//! Type interning pool.
//!
//! Interns `Type` values to `TypeId` handles with O(1) equality. Primitives
//! are pre-interned at fixed indices so their ids are compile-time
//! constants. The pool stays available for interning during elaboration
//! (pointer and instantiation types are built on demand), so access is
//! guarded by a `RwLock`; type data itself is immutable once interned.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::ty::{FloatWidth, IntWidth, Type, TypeId};

struct PoolInner {
    types: Vec<Type>,
    map: FxHashMap<Type, TypeId>,
}

/// Interning pool for semantic types.
pub struct TypePool {
    inner: RwLock<PoolInner>,
}

/// Pre-interned primitives, in declaration order. The constants on
/// [`TypeId`]-producing accessors below must match this order.
const PRIMITIVES: &[Type] = &[
    Type::Int { width: IntWidth::W8, signed: true },
    Type::Int { width: IntWidth::W16, signed: true },
    Type::Int { width: IntWidth::W32, signed: true },
    Type::Int { width: IntWidth::W64, signed: true },
    Type::Int { width: IntWidth::W8, signed: false },
    Type::Int { width: IntWidth::W16, signed: false },
    Type::Int { width: IntWidth::W32, signed: false },
    Type::Int { width: IntWidth::W64, signed: false },
    Type::Float { width: FloatWidth::W32 },
    Type::Float { width: FloatWidth::W64 },
    Type::Bool,
    Type::Char,
    Type::Unit,
    Type::RawPtr,
];

impl TypePool {
    pub const I8: TypeId = TypeId::from_raw(0);
    pub const I16: TypeId = TypeId::from_raw(1);
    pub const I32: TypeId = TypeId::from_raw(2);
    pub const I64: TypeId = TypeId::from_raw(3);
    pub const U8: TypeId = TypeId::from_raw(4);
    pub const U16: TypeId = TypeId::from_raw(5);
    pub const U32: TypeId = TypeId::from_raw(6);
    pub const U64: TypeId = TypeId::from_raw(7);
    pub const F32: TypeId = TypeId::from_raw(8);
    pub const F64: TypeId = TypeId::from_raw(9);
    pub const BOOL: TypeId = TypeId::from_raw(10);
    pub const CHAR: TypeId = TypeId::from_raw(11);
    pub const UNIT: TypeId = TypeId::from_raw(12);
    pub const RAWPTR: TypeId = TypeId::from_raw(13);

    pub fn new() -> Self {
        let mut inner = PoolInner {
            types: Vec::with_capacity(64),
            map: FxHashMap::default(),
        };
        for ty in PRIMITIVES {
            let id = TypeId::from_raw(inner.types.len() as u32);
            inner.types.push(ty.clone());
            inner.map.insert(ty.clone(), id);
        }
        TypePool {
            inner: RwLock::new(inner),
        }
    }

    /// Intern a type, returning its id. Structurally equal types share one
    /// id.
    pub fn intern(&self, ty: Type) -> TypeId {
        {
            let guard = self.inner.read();
            if let Some(&id) = guard.map.get(&ty) {
                return id;
            }
        }

        let mut guard = self.inner.write();
        if let Some(&id) = guard.map.get(&ty) {
            return id;
        }
        let id = TypeId::from_raw(u32::try_from(guard.types.len()).expect("type pool overflow"));
        guard.types.push(ty.clone());
        guard.map.insert(ty, id);
        id
    }

    /// Get a clone of the interned type.
    pub fn get(&self, id: TypeId) -> Type {
        self.inner.read().types[id.index()].clone()
    }

    /// Run `f` against the interned type without cloning.
    pub fn with<R>(&self, id: TypeId, f: impl FnOnce(&Type) -> R) -> R {
        f(&self.inner.read().types[id.index()])
    }

    pub fn len(&self) -> usize {
        self.inner.read().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}
