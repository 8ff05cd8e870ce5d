//! Variadic memoization trie.
//!
//! Descriptor constructors take anywhere from zero to N sub-descriptors, so
//! interning is keyed by an *ordered sequence* of keys rather than a
//! fixed-arity tuple: each key selects one trie layer, and every layer
//! carries both a child map and a value slot (one call's full key sequence
//! is another call's prefix).
//!
//! `memoize` has single-winner semantics: two threads racing on the same
//! not-yet-cached path agree on one stored value, and the loser's
//! speculative build never escapes.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

/// One step of an interning path. Mixed-type on purpose: a single
/// constructor key sequence interleaves tags, handles, interned text, and
/// scalar payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Descriptor variant tag; the leading key of every path.
    Tag(u8),
    /// A child descriptor handle.
    Desc(crate::types::DescId),
    /// Interned text (record keys, string/bigint literal payloads).
    Text(tyr_common::Atom),
    /// An opaque token id (brands).
    Token(u64),
    Bool(bool),
    /// Raw scalar bits (number literals, generic arity).
    Bits(u64),
}

/// One trie layer: child map plus an at-most-once value slot.
pub struct CacheLayer<T> {
    children: DashMap<CacheKey, Arc<CacheLayer<T>>, FxBuildHasher>,
    value: OnceLock<T>,
}

impl<T: Clone> CacheLayer<T> {
    fn new() -> Self {
        Self {
            children: DashMap::with_hasher(FxBuildHasher),
            value: OnceLock::new(),
        }
    }

    /// Child layer for `key`, created if absent. Racing creators agree on
    /// one layer.
    pub fn child(&self, key: CacheKey) -> Arc<CacheLayer<T>> {
        if let Some(existing) = self.children.get(&key) {
            return existing.clone();
        }
        self.children
            .entry(key)
            .or_insert_with(|| Arc::new(CacheLayer::new()))
            .clone()
    }

    /// The value stored at this layer, if any.
    pub fn value(&self) -> Option<T> {
        self.value.get().cloned()
    }

    /// Store-or-fetch. The builder runs at most once per layer for the
    /// process lifetime; losers of a race observe the winner's value.
    pub fn get_or_insert_with(&self, build: impl FnOnce() -> T) -> T {
        self.value.get_or_init(build).clone()
    }
}

/// Prefix-keyed memoization cache. Append-only, no eviction; the space of
/// descriptors in a program is assumed small and static.
pub struct MemoCache<T> {
    root: Arc<CacheLayer<T>>,
}

impl<T: Clone> MemoCache<T> {
    pub fn new() -> Self {
        Self {
            root: Arc::new(CacheLayer::new()),
        }
    }

    /// Walk (creating as needed) one layer per key.
    pub fn layer(&self, keys: &[CacheKey]) -> Arc<CacheLayer<T>> {
        let mut layer = self.root.clone();
        for &key in keys {
            layer = layer.child(key);
        }
        layer
    }

    /// Return the value cached under `keys`, or build, store, and return
    /// it. Absence is never an error; it simply triggers construction.
    pub fn memoize(&self, keys: &[CacheKey], build: impl FnOnce() -> T) -> T {
        self.layer(keys).get_or_insert_with(build)
    }
}

impl<T: Clone> Default for MemoCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for MemoCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache").finish_non_exhaustive()
    }
}
