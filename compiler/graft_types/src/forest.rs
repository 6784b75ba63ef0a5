//! The newtype forest: type sets and derivation trees.
//!
//! Every declared type name belongs to exactly one *type set*; sets form a
//! forest through parent edges. Names in the same set are parallel (freely
//! reliably-castable); a set reached by walking parent edges is upstream.
//!
//! The forest is an index-addressed arena: `TypeSetId` is a `u32` into a
//! vector of records with a parent index, so cycles are impossible by
//! construction. Declaration collection mutates the forest single-threaded;
//! [`TypeForest::seal`] then precomputes Euler entry/exit indices and
//! depths, producing a read-only [`SealedForest`] whose relation queries
//! are O(1) and safe to run concurrently.

use graft_ir::Name;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::pool::TypePool;
use crate::ty::{Type, TypeId};

/// Handle to a type set in the forest.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeSetId(u32);

impl TypeSetId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeSetId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for TypeSetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeSetId({})", self.0)
    }
}

/// One equivalence class of parallel type names.
#[derive(Clone, Debug)]
struct TypeSetData {
    /// Parent set, absent for tree roots.
    parent: Option<TypeSetId>,
    /// Names inserted into this set, in declaration order.
    members: SmallVec<[Name; 4]>,
    /// The inline structural type a tree root wraps. `None` for non-root
    /// sets; their structure is inherited from the tree root.
    root_type: Option<TypeId>,
}

/// Errors raised during declaration collection.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum DeclareError {
    #[error("duplicate type name")]
    DuplicateTypeName { name: Name },
}

/// The mutable forest, alive only during declaration collection.
#[derive(Default)]
pub struct TypeForest {
    sets: Vec<TypeSetData>,
    /// Declared name -> (owning set, interned `Type::Named` id).
    by_name: FxHashMap<Name, (TypeSetId, TypeId)>,
    /// Memoized root sets for underived structural types, so every
    /// `newtype` over e.g. `f64` lands in the same set.
    structural_roots: FxHashMap<TypeId, TypeSetId>,
}

impl TypeForest {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_set(&mut self, parent: Option<TypeSetId>, root_type: Option<TypeId>) -> TypeSetId {
        let id = TypeSetId::from_raw(u32::try_from(self.sets.len()).expect("forest overflow"));
        self.sets.push(TypeSetData {
            parent,
            members: SmallVec::new(),
            root_type,
        });
        id
    }

    /// Root set for a structural (non-named) type, created on first use.
    ///
    /// Memoized: all derivations from the same structural type share one
    /// origin tree.
    fn root_for_structural(&mut self, ty: TypeId) -> TypeSetId {
        if let Some(&set) = self.structural_roots.get(&ty) {
            return set;
        }
        let set = self.alloc_set(None, Some(ty));
        self.structural_roots.insert(ty, set);
        set
    }

    /// Resolve the set a type currently belongs to.
    ///
    /// Named types carry their set; generic instantiations share their
    /// base's set; structural types resolve through the memo table.
    fn set_of(&self, ty: TypeId, pool: &TypePool) -> Option<TypeSetId> {
        enum Step {
            Set(TypeSetId),
            Recurse(TypeId),
            Structural,
        }
        let step = pool.with(ty, |t| match t {
            Type::Named { set, .. } => Step::Set(*set),
            Type::Instance { base, .. } => Step::Recurse(*base),
            _ => Step::Structural,
        });
        match step {
            Step::Set(set) => Some(set),
            Step::Recurse(base) => self.set_of(base, pool),
            Step::Structural => self.structural_roots.get(&ty).copied(),
        }
    }

    fn insert_member(
        &mut self,
        name: Name,
        set: TypeSetId,
        pool: &TypePool,
    ) -> Result<TypeId, DeclareError> {
        if self.by_name.contains_key(&name) {
            return Err(DeclareError::DuplicateTypeName { name });
        }
        self.sets[set.index()].members.push(name);
        let id = pool.intern(Type::Named { name, set });
        self.by_name.insert(name, (set, id));
        Ok(id)
    }

    /// `newtype Name = T`: insert `name` into the set `underlying` belongs
    /// to. The new name becomes parallel to `underlying` and to every
    /// existing member of that set.
    pub fn declare_newtype(
        &mut self,
        name: Name,
        underlying: TypeId,
        pool: &TypePool,
    ) -> Result<TypeId, DeclareError> {
        let set = match self.set_of(underlying, pool) {
            Some(set) => set,
            None => self.root_for_structural(underlying),
        };
        debug!(?name, ?set, "declare newtype");
        self.insert_member(name, set, pool)
    }

    /// `subtype Name = T`: create a brand-new set containing only `name`,
    /// parented to `parent`'s set. Repeated calls with the same parent
    /// create distinct sibling sets that are never parallel to each other.
    pub fn declare_subtype(
        &mut self,
        name: Name,
        parent: TypeId,
        pool: &TypePool,
    ) -> Result<TypeId, DeclareError> {
        let parent_set = match self.set_of(parent, pool) {
            Some(set) => set,
            None => self.root_for_structural(parent),
        };
        let set = self.alloc_set(Some(parent_set), None);
        debug!(?name, ?set, ?parent_set, "declare subtype");
        self.insert_member(name, set, pool)
    }

    /// Aggregate sugar: `struct`/`tuple`/`enum`/`sum`/`union` declarations
    /// desugar to a newtype over their freshly built inline structural
    /// type, wrapped in a *fresh* root set. Two structurally identical
    /// aggregates get distinct trees: aggregates are nominal.
    pub fn declare_aggregate(
        &mut self,
        name: Name,
        inline: TypeId,
        pool: &TypePool,
    ) -> Result<TypeId, DeclareError> {
        let set = self.alloc_set(None, Some(inline));
        debug!(?name, ?set, "declare aggregate");
        self.insert_member(name, set, pool)
    }

    /// Look up a declared type name.
    pub fn lookup(&self, name: Name) -> Option<TypeId> {
        self.by_name.get(&name).map(|&(_, id)| id)
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Seal the forest: precompute depth and Euler entry/exit indices so
    /// ancestor queries become O(1). Consumes the mutable forest; the
    /// result is read-only and `Sync`.
    pub fn seal(self) -> SealedForest {
        let n = self.sets.len();
        let mut children: Vec<Vec<TypeSetId>> = vec![Vec::new(); n];
        for (idx, set) in self.sets.iter().enumerate() {
            if let Some(parent) = set.parent {
                children[parent.index()].push(TypeSetId::from_raw(idx as u32));
            }
        }

        let mut entry = vec![0u32; n];
        let mut exit = vec![0u32; n];
        let mut depth = vec![0u32; n];
        let mut tree_root = vec![TypeSetId::from_raw(0); n];
        let mut clock = 0u32;

        for root in 0..n {
            if self.sets[root].parent.is_some() {
                continue;
            }
            let root_id = TypeSetId::from_raw(root as u32);
            // Iterative DFS; the second stack entry marks post-order exit.
            let mut stack = vec![(root_id, 0u32, false)];
            while let Some((set, d, done)) = stack.pop() {
                if done {
                    exit[set.index()] = clock;
                    clock += 1;
                    continue;
                }
                entry[set.index()] = clock;
                clock += 1;
                depth[set.index()] = d;
                tree_root[set.index()] = root_id;
                stack.push((set, d, true));
                for &child in children[set.index()].iter().rev() {
                    stack.push((child, d + 1, false));
                }
            }
        }

        debug!(sets = n, "sealed type forest");
        SealedForest {
            sets: self.sets,
            by_name: self.by_name,
            structural_roots: self.structural_roots,
            entry,
            exit,
            depth,
            tree_root,
        }
    }
}

/// The sealed, read-only forest. Queries are O(1) and lock-free; the
/// sealed forest is shared by reference across elaboration workers.
pub struct SealedForest {
    sets: Vec<TypeSetData>,
    by_name: FxHashMap<Name, (TypeSetId, TypeId)>,
    structural_roots: FxHashMap<TypeId, TypeSetId>,
    entry: Vec<u32>,
    exit: Vec<u32>,
    depth: Vec<u32>,
    tree_root: Vec<TypeSetId>,
}

impl SealedForest {
    /// Look up a declared type name.
    pub fn lookup(&self, name: Name) -> Option<TypeId> {
        self.by_name.get(&name).map(|&(_, id)| id)
    }

    /// Members of a set, in declaration order.
    pub fn members(&self, set: TypeSetId) -> &[Name] {
        &self.sets[set.index()].members
    }

    /// Depth of a set below its tree root.
    pub fn depth(&self, set: TypeSetId) -> u32 {
        self.depth[set.index()]
    }

    /// Resolve the set a type belongs to, if any.
    pub fn set_of(&self, ty: TypeId, pool: &TypePool) -> Option<TypeSetId> {
        enum Step {
            Set(TypeSetId),
            Recurse(TypeId),
            Structural,
        }
        let step = pool.with(ty, |t| match t {
            Type::Named { set, .. } => Step::Set(*set),
            Type::Instance { base, .. } => Step::Recurse(*base),
            _ => Step::Structural,
        });
        match step {
            Step::Set(set) => Some(set),
            Step::Recurse(base) => self.set_of(base, pool),
            Step::Structural => self.structural_roots.get(&ty).copied(),
        }
    }

    /// Strict ancestor test between sets (Euler interval containment).
    fn is_strict_ancestor(&self, a: TypeSetId, b: TypeSetId) -> bool {
        a != b
            && self.entry[a.index()] <= self.entry[b.index()]
            && self.exit[b.index()] <= self.exit[a.index()]
    }

    /// Two types are parallel iff they belong to the same set. Every type
    /// is parallel to itself.
    pub fn are_parallel(&self, a: TypeId, b: TypeId, pool: &TypePool) -> bool {
        if a == b {
            return true;
        }
        match (self.set_of(a, pool), self.set_of(b, pool)) {
            (Some(sa), Some(sb)) => sa == sb,
            _ => false,
        }
    }

    /// `a` is upstream of `b` iff `a`'s set is a strict ancestor of `b`'s
    /// set within one tree. Undefined (false) across trees.
    pub fn is_upstream_of(&self, a: TypeId, b: TypeId, pool: &TypePool) -> bool {
        match (self.set_of(a, pool), self.set_of(b, pool)) {
            (Some(sa), Some(sb)) => self.is_strict_ancestor(sa, sb),
            _ => false,
        }
    }

    /// Inverse of [`Self::is_upstream_of`].
    pub fn is_downstream_of(&self, a: TypeId, b: TypeId, pool: &TypePool) -> bool {
        self.is_upstream_of(b, a, pool)
    }

    /// The structural shape of a type: named types resolve to the inline
    /// type wrapped by their tree's root; structural types are their own
    /// shape. Generic instantiations resolve through their base.
    pub fn structural_of(&self, ty: TypeId, pool: &TypePool) -> TypeId {
        enum Step {
            Root(TypeSetId),
            Recurse(TypeId),
            Shape,
        }
        let step = pool.with(ty, |t| match t {
            Type::Named { set, .. } => Step::Root(*set),
            Type::Instance { base, .. } => Step::Recurse(*base),
            _ => Step::Shape,
        });
        match step {
            Step::Root(set) => {
                let root = self.tree_root[set.index()];
                self.sets[root.index()]
                    .root_type
                    .expect("tree root always wraps an inline type")
            }
            Step::Recurse(base) => self.structural_of(base, pool),
            Step::Shape => ty,
        }
    }
}
