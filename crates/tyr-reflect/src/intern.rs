//! Descriptor interning engine.
//!
//! [`DescEngine`] owns every descriptor: an append-only node arena, the
//! interned side tables (member lists, record/function/conditional shapes),
//! a string interner for keys and literal payloads, and the memoization
//! trie that upholds the one identity invariant everything downstream
//! relies on: structurally equal construction yields the identical
//! [`DescId`].
//!
//! All methods take `&self`; the engine is shared freely across threads.
//! Nothing is ever evicted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;
use tracing::trace;
use tyr_common::{Atom, OpaqueToken, OrderedFloat, StringInterner};

use crate::memo::{CacheKey, MemoCache};
use crate::types::{
    ConditionalId, ConditionalShape, DescData, DescId, DescTag, FunctionShape, FunctionShapeId,
    IntrinsicKind, ListId, LiteralValue, PropKey, PropertyInfo, RecordFlags, RecordShape,
    RecordShapeId,
};

/// Record shapes with more properties than this get a key-to-index map.
pub const RECORD_INDEX_THRESHOLD: usize = 8;

/// Literal payload sub-tags inside the `Literal` interning path.
const LIT_STRING: u64 = 0;
const LIT_NUMBER: u64 = 1;
const LIT_BOOLEAN: u64 = 2;
const LIT_BIGINT: u64 = 3;

static GLOBAL_ENGINE: Lazy<DescEngine> = Lazy::new(DescEngine::new);

pub struct DescEngine {
    strings: StringInterner,
    memo: MemoCache<DescId>,

    next_desc: AtomicU32,
    nodes: DashMap<DescId, DescData, FxBuildHasher>,

    // Member lists are interned separately so equal lists share one
    // `Arc<[DescId]>` regardless of which variant referenced them.
    next_list: AtomicU32,
    lists: DashMap<Arc<[DescId]>, ListId, FxBuildHasher>,
    list_table: DashMap<ListId, Arc<[DescId]>, FxBuildHasher>,

    next_record: AtomicU32,
    record_table: DashMap<RecordShapeId, RecordShape, FxBuildHasher>,

    next_function: AtomicU32,
    function_table: DashMap<FunctionShapeId, FunctionShape, FxBuildHasher>,

    next_conditional: AtomicU32,
    conditional_table: DashMap<ConditionalId, ConditionalShape, FxBuildHasher>,
}

impl DescEngine {
    /// Construct an isolated engine with the intrinsics pre-registered.
    /// Tests use this to avoid cross-test leakage; most callers want
    /// [`DescEngine::global`].
    pub fn new() -> Self {
        let engine = Self {
            strings: StringInterner::new(),
            memo: MemoCache::new(),
            next_desc: AtomicU32::new(0),
            nodes: DashMap::with_hasher(FxBuildHasher),
            next_list: AtomicU32::new(0),
            lists: DashMap::with_hasher(FxBuildHasher),
            list_table: DashMap::with_hasher(FxBuildHasher),
            next_record: AtomicU32::new(0),
            record_table: DashMap::with_hasher(FxBuildHasher),
            next_function: AtomicU32::new(0),
            function_table: DashMap::with_hasher(FxBuildHasher),
            next_conditional: AtomicU32::new(0),
            conditional_table: DashMap::with_hasher(FxBuildHasher),
        };
        for kind in IntrinsicKind::ALL {
            let id = engine.alloc(DescData::Intrinsic(kind));
            debug_assert_eq!(id, kind.desc_id());
        }
        engine
    }

    /// The process-wide engine. Constructed on first use, never torn down.
    pub fn global() -> &'static DescEngine {
        &GLOBAL_ENGINE
    }

    // ------------------------------------------------------------------
    // Arena and side-table access
    // ------------------------------------------------------------------

    fn alloc(&self, data: DescData) -> DescId {
        let id = DescId(self.next_desc.fetch_add(1, Ordering::Relaxed));
        self.nodes.insert(id, data);
        trace!(id = id.0, ?data, "alloc descriptor");
        id
    }

    /// Variant data for a handle. `None` only for handles from a different
    /// engine.
    pub fn lookup(&self, id: DescId) -> Option<DescData> {
        self.nodes.get(&id).map(|data| *data)
    }

    /// Number of descriptors allocated so far (intrinsics included).
    pub fn descriptor_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn intern_string(&self, text: &str) -> Atom {
        self.strings.intern(text)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.strings.resolve(atom)
    }

    fn intern_list(&self, members: &[DescId]) -> ListId {
        if let Some(existing) = self.lists.get(members) {
            return *existing;
        }
        let arc: Arc<[DescId]> = members.into();
        *self.lists.entry(arc.clone()).or_insert_with(|| {
            let id = ListId(self.next_list.fetch_add(1, Ordering::Relaxed));
            self.list_table.insert(id, arc);
            id
        })
    }

    /// Shared member list for a tuple/union/intersection id.
    pub fn list(&self, id: ListId) -> Arc<[DescId]> {
        self.list_table
            .get(&id)
            .map(|list| list.clone())
            .unwrap_or_else(|| Arc::from([].as_slice()))
    }

    pub fn record_shape(&self, id: RecordShapeId) -> RecordShape {
        self.record_table
            .get(&id)
            .map(|shape| shape.clone())
            .unwrap_or_else(|| RecordShape {
                properties: Arc::from([].as_slice()),
                flags: RecordFlags::empty(),
                index: None,
            })
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> FunctionShape {
        self.function_table
            .get(&id)
            .map(|shape| shape.clone())
            .unwrap_or_else(|| FunctionShape {
                params: Arc::from([].as_slice()),
                return_type: DescId::NEVER,
                generic_arity: 0,
            })
    }

    pub fn conditional_shape(&self, id: ConditionalId) -> ConditionalShape {
        self.conditional_table
            .get(&id)
            .map(|shape| *shape)
            .unwrap_or(ConditionalShape {
                extension: DescId::NEVER,
                base: DescId::NEVER,
                yes: DescId::NEVER,
                no: DescId::NEVER,
            })
    }

    // ------------------------------------------------------------------
    // Literal leaves
    // ------------------------------------------------------------------

    pub fn literal_string(&self, value: &str) -> DescId {
        let atom = self.intern_string(value);
        self.memo.memoize(
            &[
                CacheKey::Tag(DescTag::Literal as u8),
                CacheKey::Bits(LIT_STRING),
                CacheKey::Text(atom),
            ],
            || self.alloc(DescData::Literal(LiteralValue::String(atom))),
        )
    }

    pub fn literal_number(&self, value: f64) -> DescId {
        let value = OrderedFloat(value);
        self.memo.memoize(
            &[
                CacheKey::Tag(DescTag::Literal as u8),
                CacheKey::Bits(LIT_NUMBER),
                CacheKey::Bits(value.canonical_bits()),
            ],
            || self.alloc(DescData::Literal(LiteralValue::Number(value))),
        )
    }

    pub fn literal_boolean(&self, value: bool) -> DescId {
        self.memo.memoize(
            &[
                CacheKey::Tag(DescTag::Literal as u8),
                CacheKey::Bits(LIT_BOOLEAN),
                CacheKey::Bool(value),
            ],
            || self.alloc(DescData::Literal(LiteralValue::Boolean(value))),
        )
    }

    /// Big integers are carried as their decimal text.
    pub fn literal_bigint(&self, digits: &str) -> DescId {
        let atom = self.intern_string(digits);
        self.memo.memoize(
            &[
                CacheKey::Tag(DescTag::Literal as u8),
                CacheKey::Bits(LIT_BIGINT),
                CacheKey::Text(atom),
            ],
            || self.alloc(DescData::Literal(LiteralValue::BigInt(atom))),
        )
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    pub fn record(&self, properties: Vec<PropertyInfo>) -> DescId {
        self.record_with_flags(properties, RecordFlags::empty())
    }

    /// Record whose absent or undefined-valued properties still satisfy it.
    pub fn optional_record(&self, properties: Vec<PropertyInfo>) -> DescId {
        self.record_with_flags(properties, RecordFlags::OPTIONAL_PROPS)
    }

    pub fn record_with_flags(&self, properties: Vec<PropertyInfo>, flags: RecordFlags) -> DescId {
        let canonical = self.canonicalize_properties(properties);

        let mut keys: SmallVec<[CacheKey; 12]> = SmallVec::new();
        keys.push(CacheKey::Tag(DescTag::Record as u8));
        keys.push(CacheKey::Bits(u64::from(flags.bits())));
        for prop in &canonical {
            keys.push(match prop.key {
                PropKey::Text(atom) => CacheKey::Text(atom),
                PropKey::Opaque(token) => CacheKey::Token(token.id()),
            });
            keys.push(CacheKey::Desc(prop.value));
        }

        self.memo.memoize(&keys, || {
            let properties: Arc<[PropertyInfo]> = canonical.as_slice().into();
            let index = (properties.len() > RECORD_INDEX_THRESHOLD).then(|| {
                let map: FxHashMap<PropKey, usize> = properties
                    .iter()
                    .enumerate()
                    .map(|(at, prop)| (prop.key, at))
                    .collect();
                Arc::new(map)
            });
            let shape_id = RecordShapeId(self.next_record.fetch_add(1, Ordering::Relaxed));
            self.record_table.insert(
                shape_id,
                RecordShape {
                    properties,
                    flags,
                    index,
                },
            );
            self.alloc(DescData::Record(shape_id))
        })
    }

    /// Duplicate keys resolve last-writer-wins; survivors are sorted into
    /// canonical order (text keys lexicographically, then opaque keys by
    /// token id) so member order at the call site never affects interning.
    fn canonicalize_properties(&self, properties: Vec<PropertyInfo>) -> Vec<PropertyInfo> {
        let mut order: Vec<PropKey> = Vec::with_capacity(properties.len());
        let mut by_key: FxHashMap<PropKey, DescId> = FxHashMap::default();
        for prop in properties {
            if by_key.insert(prop.key, prop.value).is_none() {
                order.push(prop.key);
            }
        }

        let mut keyed: Vec<((bool, Option<Arc<str>>, u64), PropertyInfo)> = order
            .into_iter()
            .map(|key| {
                let sort_key = match key {
                    PropKey::Text(atom) => (false, Some(self.strings.resolve(atom)), 0),
                    PropKey::Opaque(token) => (true, None, token.id()),
                };
                (sort_key, PropertyInfo::new(key, by_key[&key]))
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, prop)| prop).collect()
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    pub fn array(&self, item: DescId) -> DescId {
        self.memo.memoize(
            &[CacheKey::Tag(DescTag::Array as u8), CacheKey::Desc(item)],
            || self.alloc(DescData::Array(item)),
        )
    }

    pub fn set_of(&self, item: DescId) -> DescId {
        self.memo.memoize(
            &[CacheKey::Tag(DescTag::SetOf as u8), CacheKey::Desc(item)],
            || self.alloc(DescData::SetOf(item)),
        )
    }

    pub fn map_of(&self, key: DescId, value: DescId) -> DescId {
        self.memo.memoize(
            &[
                CacheKey::Tag(DescTag::MapOf as u8),
                CacheKey::Desc(key),
                CacheKey::Desc(value),
            ],
            || self.alloc(DescData::MapOf(key, value)),
        )
    }

    /// Order-significant: `tuple([a, b])` and `tuple([b, a])` are distinct.
    pub fn tuple(&self, members: Vec<DescId>) -> DescId {
        let mut keys: SmallVec<[CacheKey; 8]> = SmallVec::new();
        keys.push(CacheKey::Tag(DescTag::Tuple as u8));
        keys.extend(members.iter().map(|&m| CacheKey::Desc(m)));
        self.memo.memoize(&keys, || {
            let list = self.intern_list(&members);
            self.alloc(DescData::Tuple(list))
        })
    }

    /// Order-insignificant: members are sorted by creation order (and exact
    /// duplicates collapsed) before interning, so `A | B` and `B | A` are
    /// the same descriptor. No semantic reduction happens here.
    pub fn union(&self, members: Vec<DescId>) -> DescId {
        self.sorted_members(DescTag::Union, members, DescData::Union)
    }

    /// Same canonicalization as [`DescEngine::union`].
    pub fn intersection(&self, members: Vec<DescId>) -> DescId {
        self.sorted_members(DescTag::Intersection, members, DescData::Intersection)
    }

    fn sorted_members(
        &self,
        tag: DescTag,
        mut members: Vec<DescId>,
        make: fn(ListId) -> DescData,
    ) -> DescId {
        members.sort_unstable();
        members.dedup();

        let mut keys: SmallVec<[CacheKey; 8]> = SmallVec::new();
        keys.push(CacheKey::Tag(tag as u8));
        keys.extend(members.iter().map(|&m| CacheKey::Desc(m)));
        self.memo.memoize(&keys, || {
            let list = self.intern_list(&members);
            self.alloc(make(list))
        })
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    pub fn function(&self, params: Vec<DescId>, return_type: DescId) -> DescId {
        self.function_with_arity(params, return_type, 0)
    }

    /// Generic over [`DescId::GENERIC_1`].
    pub fn single_generic_function(&self, params: Vec<DescId>, return_type: DescId) -> DescId {
        self.function_with_arity(params, return_type, 1)
    }

    /// Generic over [`DescId::GENERIC_1`] and [`DescId::GENERIC_2`].
    pub fn double_generic_function(&self, params: Vec<DescId>, return_type: DescId) -> DescId {
        self.function_with_arity(params, return_type, 2)
    }

    /// Generic over all three reserved placeholders.
    pub fn triple_generic_function(&self, params: Vec<DescId>, return_type: DescId) -> DescId {
        self.function_with_arity(params, return_type, 3)
    }

    pub(crate) fn function_with_arity(
        &self,
        params: Vec<DescId>,
        return_type: DescId,
        generic_arity: u8,
    ) -> DescId {
        let mut keys: SmallVec<[CacheKey; 8]> = SmallVec::new();
        keys.push(CacheKey::Tag(DescTag::Function as u8));
        keys.push(CacheKey::Bits(u64::from(generic_arity)));
        keys.extend(params.iter().map(|&p| CacheKey::Desc(p)));
        keys.push(CacheKey::Desc(return_type));
        self.memo.memoize(&keys, || {
            let params = self.intern_list(&params);
            let params = self.list(params);
            let shape_id = FunctionShapeId(self.next_function.fetch_add(1, Ordering::Relaxed));
            self.function_table.insert(
                shape_id,
                FunctionShape {
                    params,
                    return_type,
                    generic_arity,
                },
            );
            self.alloc(DescData::Function(shape_id))
        })
    }

    // ------------------------------------------------------------------
    // Wrappers and leaves
    // ------------------------------------------------------------------

    /// One descriptor per token: branding the same token twice yields the
    /// same descriptor; distinct tokens never unify.
    pub fn brand(&self, token: OpaqueToken) -> DescId {
        self.memo.memoize(
            &[
                CacheKey::Tag(DescTag::Brand as u8),
                CacheKey::Token(token.id()),
            ],
            || self.alloc(DescData::Brand(token)),
        )
    }

    /// Idempotent (readonly of readonly is the inner readonly) and
    /// distributes over intersections.
    pub fn readonly(&self, inner: DescId) -> DescId {
        match self.lookup(inner) {
            Some(DescData::Readonly(_)) => inner,
            Some(DescData::Intersection(list)) => {
                let members = self.list(list);
                let wrapped: Vec<DescId> = members.iter().map(|&m| self.readonly(m)).collect();
                self.intersection(wrapped)
            }
            _ => self.memo.memoize(
                &[
                    CacheKey::Tag(DescTag::Readonly as u8),
                    CacheKey::Desc(inner),
                ],
                || self.alloc(DescData::Readonly(inner)),
            ),
        }
    }

    /// The descriptor of a descriptor; one level of reification.
    pub fn meta(&self, inner: DescId) -> DescId {
        self.memo.memoize(
            &[CacheKey::Tag(DescTag::Meta as u8), CacheKey::Desc(inner)],
            || self.alloc(DescData::Meta(inner)),
        )
    }

    /// Opaque conditional node. Whether `extension` satisfies `base` is
    /// never resolved by this crate.
    pub fn conditional(&self, extension: DescId, base: DescId, yes: DescId, no: DescId) -> DescId {
        self.memo.memoize(
            &[
                CacheKey::Tag(DescTag::Conditional as u8),
                CacheKey::Desc(extension),
                CacheKey::Desc(base),
                CacheKey::Desc(yes),
                CacheKey::Desc(no),
            ],
            || {
                let shape_id =
                    ConditionalId(self.next_conditional.fetch_add(1, Ordering::Relaxed));
                self.conditional_table.insert(
                    shape_id,
                    ConditionalShape {
                        extension,
                        base,
                        yes,
                        no,
                    },
                );
                self.alloc(DescData::Conditional(shape_id))
            },
        )
    }

    /// A predicate distinguishing `to` within `from`.
    pub fn guard_sig(&self, from: DescId, to: DescId) -> DescId {
        self.memo.memoize(
            &[
                CacheKey::Tag(DescTag::GuardSig as u8),
                CacheKey::Desc(from),
                CacheKey::Desc(to),
            ],
            || self.alloc(DescData::GuardSig(from, to)),
        )
    }
}

impl Default for DescEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DescEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescEngine")
            .field("descriptors", &self.descriptor_count())
            .finish_non_exhaustive()
    }
}
