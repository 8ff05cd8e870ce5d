//! Core descriptor representation.
//!
//! A descriptor is an interned node standing in for a static type. All
//! variants live in the closed [`DescData`] enum; variable-size payloads are
//! held in interned side tables and referenced by id, so `DescData` itself
//! stays `Copy` and equality of descriptors is equality of [`DescId`]
//! handles.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tyr_common::{Atom, OpaqueToken, OrderedFloat};

/// Handle to an interned descriptor.
///
/// Handles are allocated monotonically by the owning [`DescEngine`], so
/// `DescId` order is creation order. That ordering is what canonicalizes
/// union/intersection member lists; it is never used as a proxy for
/// structural relationships.
///
/// [`DescEngine`]: crate::intern::DescEngine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescId(pub u32);

impl DescId {
    pub const STRING: DescId = DescId(0);
    pub const NUMBER: DescId = DescId(1);
    pub const BIGINT: DescId = DescId(2);
    pub const BOOLEAN: DescId = DescId(3);
    pub const SYMBOL: DescId = DescId(4);
    pub const VOID: DescId = DescId(5);
    pub const NULL: DescId = DescId(6);
    pub const UNDEFINED: DescId = DescId(7);
    pub const NEVER: DescId = DescId(8);
    pub const UNKNOWN: DescId = DescId(9);
    pub const ANY: DescId = DescId(10);
    pub const OBJECT: DescId = DescId(11);
    /// Distinguished placeholder consumed by mapped-record templates.
    pub const SOURCE: DescId = DescId(12);
    /// Reserved placeholders closed over by generic function descriptors.
    pub const GENERIC_1: DescId = DescId(13);
    pub const GENERIC_2: DescId = DescId(14);
    pub const GENERIC_3: DescId = DescId(15);
}

/// Number of pre-registered intrinsic descriptors.
pub const INTRINSIC_COUNT: u32 = 16;

/// Intrinsic leaf kinds, registered once per engine in [`DescId`] constant
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IntrinsicKind {
    String,
    Number,
    BigInt,
    Boolean,
    Symbol,
    Void,
    Null,
    Undefined,
    Never,
    Unknown,
    Any,
    Object,
    Source,
    Generic1,
    Generic2,
    Generic3,
}

impl IntrinsicKind {
    /// All intrinsics, in registration order.
    pub const ALL: [IntrinsicKind; INTRINSIC_COUNT as usize] = [
        IntrinsicKind::String,
        IntrinsicKind::Number,
        IntrinsicKind::BigInt,
        IntrinsicKind::Boolean,
        IntrinsicKind::Symbol,
        IntrinsicKind::Void,
        IntrinsicKind::Null,
        IntrinsicKind::Undefined,
        IntrinsicKind::Never,
        IntrinsicKind::Unknown,
        IntrinsicKind::Any,
        IntrinsicKind::Object,
        IntrinsicKind::Source,
        IntrinsicKind::Generic1,
        IntrinsicKind::Generic2,
        IntrinsicKind::Generic3,
    ];

    /// The fixed handle every engine assigns this intrinsic.
    pub const fn desc_id(self) -> DescId {
        DescId(self as u32)
    }
}

/// Literal leaf payload. Treated as opaque for identity purposes: two
/// literals are the same descriptor iff their payloads are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
    BigInt(Atom),
}

/// Record property key: textual, or an opaque token standing in for a
/// symbol-keyed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKey {
    Text(Atom),
    Opaque(OpaqueToken),
}

/// One record property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub key: PropKey,
    pub value: DescId,
}

impl PropertyInfo {
    pub fn new(key: PropKey, value: DescId) -> Self {
        Self { key, value }
    }

    pub fn text(key: Atom, value: DescId) -> Self {
        Self {
            key: PropKey::Text(key),
            value,
        }
    }
}

bitflags::bitflags! {
    /// Record-level flags. Part of the interning key: records that differ
    /// only in flags are distinct descriptors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RecordFlags: u8 {
        /// Absent or undefined-valued properties satisfy the record.
        const OPTIONAL_PROPS = 1 << 0;
    }
}

/// Interned member list id (tuples, unions, intersections, parameters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(pub u32);

/// Interned record shape id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordShapeId(pub u32);

/// Interned function shape id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

/// Interned conditional shape id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConditionalId(pub u32);

/// Record payload: properties stored in canonical sort order (text keys
/// lexicographically, opaque keys after them by token id), plus flags.
#[derive(Debug, Clone)]
pub struct RecordShape {
    pub properties: Arc<[PropertyInfo]>,
    pub flags: RecordFlags,
    /// Key-to-index map, populated only for shapes with many properties.
    pub(crate) index: Option<Arc<FxHashMap<PropKey, usize>>>,
}

/// Outcome of an indexed property lookup on a record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyLookup {
    Found(usize),
    NotFound,
    /// The shape is below the indexing threshold; scan `properties`.
    Uncached,
}

impl RecordShape {
    /// O(1) lookup for indexed shapes, `Uncached` for small ones.
    pub fn property_index(&self, key: PropKey) -> PropertyLookup {
        match &self.index {
            Some(index) => match index.get(&key) {
                Some(&at) => PropertyLookup::Found(at),
                None => PropertyLookup::NotFound,
            },
            None => PropertyLookup::Uncached,
        }
    }

    /// Position of `key`, scanning when the shape is unindexed.
    pub fn find_property(&self, key: PropKey) -> Option<usize> {
        match self.property_index(key) {
            PropertyLookup::Found(at) => Some(at),
            PropertyLookup::NotFound => None,
            PropertyLookup::Uncached => self.properties.iter().position(|p| p.key == key),
        }
    }
}

/// Function payload. Generic forms (`generic_arity` 1..=3) close over the
/// reserved `Generic1..Generic3` placeholder leaves; instantiation swaps
/// those placeholders out and drops the arity.
#[derive(Debug, Clone)]
pub struct FunctionShape {
    pub params: Arc<[DescId]>,
    pub return_type: DescId,
    pub generic_arity: u8,
}

/// Conditional payload. Deliberately opaque: whether `extension` satisfies
/// `base` is never resolved by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConditionalShape {
    pub extension: DescId,
    pub base: DescId,
    pub yes: DescId,
    pub no: DescId,
}

/// The closed descriptor variant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    Record(RecordShapeId),
    Array(DescId),
    SetOf(DescId),
    MapOf(DescId, DescId),
    Tuple(ListId),
    Union(ListId),
    Intersection(ListId),
    Function(FunctionShapeId),
    Brand(OpaqueToken),
    Readonly(DescId),
    Meta(DescId),
    Conditional(ConditionalId),
    GuardSig(DescId, DescId),
}

/// Variant tag, used as the leading key of every interning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub(crate) enum DescTag {
    Literal,
    Record,
    Array,
    SetOf,
    MapOf,
    Tuple,
    Union,
    Intersection,
    Function,
    Brand,
    Readonly,
    Meta,
    Conditional,
    GuardSig,
}
