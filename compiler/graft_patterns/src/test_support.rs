//! Shared fixtures for pattern tests.

use graft_ir::{
    Expr, ExprArena, ExprId, ExprKind, Name, Pattern, PatternId, PatternKind, Span,
    StringInterner,
};
use graft_types::{Primitives, SealedForest, Type, TypeForest, TypeId, TypePool};

use crate::PatternCx;

/// A sealed mini-program: `Meters` (newtype over f64), `Option` (sum of
/// `Some(i32)` / `None`), `Point` (struct of two f32 fields).
pub(crate) struct Fixture {
    pub pool: TypePool,
    pub interner: StringInterner,
    pub primitives: Primitives,
    pub forest: SealedForest,
    pub arena: ExprArena,
    pub meters: TypeId,
    pub option_i32: TypeId,
    pub point: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let pool = TypePool::new();
        let interner = StringInterner::new();
        let primitives = Primitives::intern(&interner);
        let mut forest = TypeForest::new();

        let meters = forest
            .declare_newtype(interner.intern("Meters"), TypePool::F64, &pool)
            .unwrap();

        let option_inline = pool.intern(Type::Sum(vec![
            (interner.intern("Some"), Some(TypePool::I32)),
            (interner.intern("None"), None),
        ]));
        let option_i32 = forest
            .declare_aggregate(interner.intern("Option"), option_inline, &pool)
            .unwrap();

        let point_inline = pool.intern(Type::Struct(vec![
            (interner.intern("x"), TypePool::F32),
            (interner.intern("y"), TypePool::F32),
        ]));
        let point = forest
            .declare_aggregate(interner.intern("Point"), point_inline, &pool)
            .unwrap();

        Fixture {
            pool,
            primitives,
            forest: forest.seal(),
            arena: ExprArena::new(),
            interner,
            meters,
            option_i32,
            point,
        }
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn pattern(&mut self, kind: PatternKind) -> PatternId {
        self.arena.alloc_pattern(Pattern::new(kind, Span::DUMMY))
    }

    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, Span::DUMMY))
    }

    pub fn cx(&self) -> PatternCx<'_> {
        PatternCx {
            arena: &self.arena,
            interner: &self.interner,
            forest: &self.forest,
            pool: &self.pool,
            primitives: &self.primitives,
        }
    }
}
