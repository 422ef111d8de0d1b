//! String interning for the indexer.
//!
//! Identifier and property-name text is interned so that name comparison
//! and binding-table lookups are O(1) integer operations.

use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::Arc;

/// An interned string handle. Comparing two `Interned` values is an O(1)
/// integer comparison; the interner resolves the handle back to text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Interned(Spur);

impl Interned {
    /// Create from a raw lasso key.
    #[inline]
    pub fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    /// Get the raw lasso key.
    #[inline]
    pub fn as_spur(self) -> Spur {
        self.0
    }
}

impl fmt::Debug for Interned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interned({:?})", self.0)
    }
}

/// Thread-safe string interner shared across the pipeline.
///
/// Cloning is cheap; all clones share the same pool.
#[derive(Clone)]
pub struct StringInterner {
    rodeo: Arc<ThreadedRodeo>,
}

impl StringInterner {
    /// Create a new string interner.
    pub fn new() -> Self {
        Self {
            rodeo: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern a string, returning a handle to the interned value.
    /// If the string was already interned, returns the existing handle.
    #[inline]
    pub fn intern(&self, s: &str) -> Interned {
        Interned::from_spur(self.rodeo.get_or_intern(s))
    }

    /// Intern a static string. More efficient than `intern` for literals.
    #[inline]
    pub fn intern_static(&self, s: &'static str) -> Interned {
        Interned::from_spur(self.rodeo.get_or_intern_static(s))
    }

    /// Look up an already-interned string without interning it if absent.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Interned> {
        self.rodeo.get(s).map(Interned::from_spur)
    }

    /// Resolve an interned handle back to its string content.
    #[inline]
    pub fn resolve(&self, key: Interned) -> &str {
        self.rodeo.resolve(&key.as_spur())
    }

    /// Returns the number of interned strings.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns true if no strings have been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let interner = StringInterner::new();
        let a = interner.intern("scope");
        let b = interner.intern("scope");
        let c = interner.intern("path");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "scope");
        assert_eq!(interner.resolve(c), "path");
    }

    #[test]
    fn test_get() {
        let interner = StringInterner::new();
        assert!(interner.get("missing").is_none());
        let a = interner.intern("missing");
        assert_eq!(interner.get("missing"), Some(a));
    }

    #[test]
    fn test_shared_pool() {
        let interner = StringInterner::new();
        let clone = interner.clone();
        let a = interner.intern("shared");
        assert_eq!(clone.get("shared"), Some(a));
    }
}
