//! Interned identifiers and the string interner.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Interned string identifier.
///
/// A plain index into the [`StringInterner`]. Two `Name`s compare equal iff
/// they refer to the same string, making identifier comparison O(1).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

struct InternerInner {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// String interner shared by all compiler phases.
///
/// Interned strings are leaked to obtain `'static` lifetime; the interner
/// lives for the whole compilation, so this never accumulates garbage.
///
/// # Thread Safety
/// A single `RwLock` guards the table. Interning is write-locked only on
/// first sight of a string; lookups take the read lock.
pub struct StringInterner {
    inner: RwLock<InternerInner>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut inner = InternerInner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        // Index 0 is reserved for the empty string so Name::EMPTY is valid.
        inner.map.insert("", 0);
        inner.strings.push("");
        StringInterner {
            inner: RwLock::new(inner),
        }
    }

    /// Intern a string, returning its `Name`.
    pub fn intern(&self, s: &str) -> Name {
        {
            let guard = self.inner.read();
            if let Some(&idx) = guard.map.get(s) {
                return Name(idx);
            }
        }

        let mut guard = self.inner.write();
        // Double-check after acquiring the write lock.
        if let Some(&idx) = guard.map.get(s) {
            return Name(idx);
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(guard.strings.len()).expect("interner overflow");
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name(idx)
    }

    /// Look up the string for a `Name`.
    ///
    /// Interned strings are leaked, so the returned reference is `'static`.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.inner.read();
        guard.strings[name.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle to a [`StringInterner`], cloned into rayon workers.
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_lookup() {
        let interner = StringInterner::new();
        let a = interner.intern("meters");
        let b = interner.intern("seconds");
        let a2 = interner.intern("meters");

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(interner.lookup(a), "meters");
        assert_eq!(interner.lookup(b), "seconds");
    }

    #[test]
    fn test_empty_string_reserved() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn test_shared_interner() {
        let interner = SharedInterner::new();
        let clone = interner.clone();
        assert_eq!(interner.intern("x"), clone.intern("x"));
    }
}
