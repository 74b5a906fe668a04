//! String interner for efficient string storage and comparison.
//!
//! Uses `Arc<str>` for cheap cloning (reference count increment instead of
//! allocation). The interner deduplicates strings so identical strings share
//! the same allocation, and is safe to read from multiple threads once the
//! semantic tables it backs are frozen.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

/// An interned string - cheap to clone (just an Arc increment)
pub type IStr = Arc<str>;

/// String interner that deduplicates strings.
///
/// Interning a string returns an `Arc<str>` that can be cheaply cloned.
/// If the same string is interned multiple times, the same `Arc` is returned.
#[derive(Debug, Default)]
pub struct Interner {
    strings: RwLock<FxHashSet<Arc<str>>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning a cheap-to-clone reference.
    ///
    /// If the string was already interned, returns the existing `Arc`.
    /// Otherwise, creates a new `Arc` and stores it.
    pub fn intern(&self, s: &str) -> IStr {
        if let Some(existing) = self.strings.read().get(s) {
            return Arc::clone(existing);
        }
        let mut strings = self.strings.write();
        if let Some(existing) = strings.get(s) {
            Arc::clone(existing)
        } else {
            let arc: Arc<str> = Arc::from(s);
            strings.insert(Arc::clone(&arc));
            arc
        }
    }

    /// Get an interned string if it exists, without creating it.
    pub fn get(&self, s: &str) -> Option<IStr> {
        self.strings.read().get(s).cloned()
    }

    /// Number of unique strings interned.
    pub fn len(&self) -> usize {
        self.strings.read().len()
    }

    /// Returns true if no strings have been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_returns_same_arc() {
        let interner = Interner::new();
        let a = interner.intern("receiver");
        let b = interner.intern("receiver");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_distinct_strings_distinct_arcs() {
        let interner = Interner::new();
        let a = interner.intern("total");
        let b = interner.intern("scale");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_get_does_not_insert() {
        let interner = Interner::new();
        assert!(interner.get("missing").is_none());
        assert!(interner.is_empty());
    }
}
