//! Interned Runtime Type Descriptors
//!
//! This crate implements a runtime model of a static type system. It
//! builds, canonicalizes, and rewrites structural descriptors standing in
//! for types:
//!
//! - **Interning**: every constructor routes through a variadic
//!   memoization trie, so structurally equal construction yields the
//!   identical [`DescId`] — O(1) equality via handle comparison.
//! - **Substitution**: `swap` rewrites a descriptor graph, replacing
//!   placeholder occurrences with concrete descriptors while sharing
//!   untouched sub-graphs. Mapped records and generic function
//!   instantiation are built on it.
//! - **Capability repositories**: the lookup shape (`get -> Option`)
//!   shared by guard/transform/resolution consumers, with chain and cache
//!   combinators.
//!
//! Descriptors are pure values: no inference, no conditional evaluation,
//! no I/O. Graphs cannot contain reference cycles because constructors
//! take fully built children.

mod error;
mod intern;
mod mapped;
pub mod memo;
pub mod queries;
mod repository;
mod swap;
pub mod types;

pub use error::ReflectError;
pub use intern::{DescEngine, RECORD_INDEX_THRESHOLD};
pub use memo::{CacheKey, CacheLayer, MemoCache};
pub use repository::{
    CachedRepository, CapabilityRepository, ChainRepository, MapRepository, require,
};
pub use types::{
    ConditionalId, ConditionalShape, DescData, DescId, FunctionShape, FunctionShapeId,
    INTRINSIC_COUNT, IntrinsicKind, ListId, LiteralValue, PropKey, PropertyInfo, PropertyLookup,
    RecordFlags, RecordShape, RecordShapeId,
};

pub use tyr_common::{Atom, OpaqueToken, OrderedFloat};

#[cfg(test)]
mod tests;
