//! String interning.
//!
//! Record keys and string-ish literal payloads are interned to `Atom`s so
//! identity-sensitive code (cache keys, property sorts) compares small
//! integers and resolved text is shared.

use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

/// Handle to an interned string. Equal text always yields an equal atom
/// within one `StringInterner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

/// Append-only string interner. All methods take `&self`; the interner is
/// shared freely across threads.
pub struct StringInterner {
    map: DashMap<Arc<str>, Atom, FxBuildHasher>,
    strings: RwLock<Vec<Arc<str>>>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self {
            map: DashMap::with_hasher(FxBuildHasher),
            strings: RwLock::new(Vec::new()),
        }
    }

    /// Intern a string, returning its atom. Racing interns of the same text
    /// agree on one winner.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(atom) = self.map.get(text) {
            return *atom;
        }
        let arc: Arc<str> = Arc::from(text);
        // The entry API arbitrates races: the losing thread observes the
        // winner's atom instead of allocating a second one.
        *self.map.entry(arc.clone()).or_insert_with(|| {
            let mut strings = self.strings.write().unwrap_or_else(|e| e.into_inner());
            let atom = Atom(u32::try_from(strings.len()).expect("interner overflow"));
            strings.push(arc);
            atom
        })
    }

    /// Resolve an atom back to its text.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        let strings = self.strings.read().unwrap_or_else(|e| e.into_inner());
        strings[atom.0 as usize].clone()
    }

    pub fn len(&self) -> usize {
        let strings = self.strings.read().unwrap_or_else(|e| e.into_inner());
        strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_deduplicates() {
        let interner = StringInterner::new();
        let a = interner.intern("legCount");
        let b = interner.intern("legCount");
        let c = interner.intern("sound");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(&*interner.resolve(a), "legCount");
        assert_eq!(&*interner.resolve(c), "sound");
    }

    #[test]
    fn intern_from_many_threads_agrees() {
        let interner = StringInterner::new();
        let atoms: Vec<Atom> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| interner.intern("shared")))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(atoms.windows(2).all(|w| w[0] == w[1]));
    }
}
