//! Index handles into the expression arena.
//!
//! AST nodes reference their children through `u32` arena indices rather
//! than boxes, keeping nodes small and the tree contiguous in memory.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

arena_id! {
    /// Handle to an expression in the arena.
    ExprId
}

arena_id! {
    /// Handle to a statement in the arena.
    StmtId
}

arena_id! {
    /// Handle to a match pattern in the arena.
    PatternId
}
