//! Capability repositories.
//!
//! The guard, transform, and dependency-resolution subsystems all share one
//! lookup shape: `get(key) -> capability | absent`, where the key is a
//! descriptor (or a descriptor pair) and absence is a normal outcome, not
//! an error. This module provides that shape plus its two combinators: a
//! chain-of-responsibility and a pass-through cache. Descriptor identity
//! (handle equality) is the only cache key the combinators need.

use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use tyr_common::OpaqueToken;

use crate::error::ReflectError;
use crate::types::DescId;

/// One capability lookup. `K` is `DescId` for single-descriptor consumers
/// (guards, resolution) or `(DescId, DescId)` for pairwise ones
/// (transformers).
pub trait CapabilityRepository<K, C>: Send + Sync {
    fn get(&self, key: K) -> Option<C>;
}

/// Plain functions are repositories; ad-hoc rules register as closures.
impl<K, C, F> CapabilityRepository<K, C> for F
where
    F: Fn(K) -> Option<C> + Send + Sync,
{
    fn get(&self, key: K) -> Option<C> {
        self(key)
    }
}

/// Explicit key-to-capability registrations.
pub struct MapRepository<K, C> {
    map: DashMap<K, C, FxBuildHasher>,
}

impl<K, C> MapRepository<K, C>
where
    K: Copy + Eq + std::hash::Hash,
    C: Clone,
{
    pub fn new() -> Self {
        Self {
            map: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn add(&self, key: K, capability: C) {
        self.map.insert(key, capability);
    }
}

impl<K, C> Default for MapRepository<K, C>
where
    K: Copy + Eq + std::hash::Hash,
    C: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> CapabilityRepository<K, C> for MapRepository<K, C>
where
    K: Copy + Eq + std::hash::Hash + Send + Sync,
    C: Clone + Send + Sync,
{
    fn get(&self, key: K) -> Option<C> {
        self.map.get(&key).map(|capability| capability.clone())
    }
}

/// Chain of repositories tried in registration order; the first defined
/// result wins.
pub struct ChainRepository<K, C> {
    chain: RwLock<Vec<Arc<dyn CapabilityRepository<K, C>>>>,
}

impl<K, C> ChainRepository<K, C> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            chain: RwLock::new(Vec::new()),
        })
    }

    pub fn add(&self, repository: Arc<dyn CapabilityRepository<K, C>>) {
        self.chain
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(repository);
    }

    /// Register a repository constructed with the chain itself as its
    /// sub-repository, enabling recursive lookup (e.g. a record capability
    /// asking the chain for its property capabilities).
    pub fn add_loop<R>(self: &Arc<Self>, make: impl FnOnce(Arc<Self>) -> R)
    where
        R: CapabilityRepository<K, C> + 'static,
    {
        let repository = Arc::new(make(Arc::clone(self)));
        self.add(repository);
    }
}

impl<K, C> CapabilityRepository<K, C> for ChainRepository<K, C>
where
    K: Copy + Send + Sync,
    C: Send + Sync,
{
    fn get(&self, key: K) -> Option<C> {
        // Snapshot the chain so loop repositories can re-enter `get`
        // without holding the lock.
        let chain: Vec<_> = self
            .chain
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for repository in chain {
            if let Some(capability) = repository.get(key) {
                return Some(capability);
            }
        }
        None
    }
}

/// Pass-through cache: memoizes defined results of the inner repository so
/// repeated lookups for one key resolve once. Absences are not cached (a
/// later registration may make them resolvable).
pub struct CachedRepository<K, C> {
    inner: Arc<dyn CapabilityRepository<K, C>>,
    cache: DashMap<K, C, FxBuildHasher>,
}

impl<K, C> CachedRepository<K, C>
where
    K: Copy + Eq + std::hash::Hash,
    C: Clone,
{
    pub fn new(inner: Arc<dyn CapabilityRepository<K, C>>) -> Self {
        Self {
            inner,
            cache: DashMap::with_hasher(FxBuildHasher),
        }
    }
}

impl<K, C> CapabilityRepository<K, C> for CachedRepository<K, C>
where
    K: Copy + Eq + std::hash::Hash + Send + Sync,
    C: Clone + Send + Sync,
{
    fn get(&self, key: K) -> Option<C> {
        if let Some(hit) = self.cache.get(&key) {
            return Some(hit.clone());
        }
        let resolved = self.inner.get(key)?;
        self.cache.insert(key, resolved.clone());
        Some(resolved)
    }
}

/// Convert a terminal absence into a resolution error naming the requested
/// descriptor and lookup key. Dependency resolution calls this after its
/// chain is exhausted.
pub fn require<C>(
    repository: &dyn CapabilityRepository<DescId, C>,
    descriptor: DescId,
    key: Option<OpaqueToken>,
) -> Result<C, ReflectError> {
    repository
        .get(descriptor)
        .ok_or(ReflectError::Resolution { descriptor, key })
}
