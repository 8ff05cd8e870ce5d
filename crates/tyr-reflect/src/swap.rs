//! Generic substitution ("swap").
//!
//! Rewrites a descriptor graph, replacing every node identical to a `from`
//! handle with its paired `to` handle. Rebuilt nodes re-enter the normal
//! constructors, so the output is canonical end-to-end; sub-graphs that no
//! substitution touches are returned by handle, unchanged (structural
//! sharing, not a rebuild). A per-call memo makes shared sub-graphs rewrite
//! once.
//!
//! Placeholder descriptors (`DescId::SOURCE`, `DescId::GENERIC_1..3`) are
//! ordinary intrinsics here; swap replaces whatever handles it is given.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::ReflectError;
use crate::intern::DescEngine;
use crate::types::{DescData, DescId};

impl DescEngine {
    /// Replace every occurrence of each `from` with its `to`. The first
    /// matching pair wins when a node matches several `from`s; an unmatched
    /// graph comes back as the same handle.
    pub fn swap(&self, descriptor: DescId, pairs: &[(DescId, DescId)]) -> DescId {
        debug!(root = descriptor.0, pairs = pairs.len(), "swap");
        let mut swapper = Swapper {
            engine: self,
            pairs,
            memo: FxHashMap::default(),
        };
        swapper.apply(descriptor)
    }

    /// Single-pair convenience over [`DescEngine::swap`].
    pub fn swap_one(&self, descriptor: DescId, from: DescId, to: DescId) -> DescId {
        self.swap(descriptor, &[(from, to)])
    }

    /// Instantiate a generic function descriptor: swap `GENERIC_1..k` for
    /// `args` throughout the parameters and return, yielding the plain
    /// function descriptor.
    pub fn instantiate(&self, function: DescId, args: &[DescId]) -> Result<DescId, ReflectError> {
        let Some(DescData::Function(shape_id)) = self.lookup(function) else {
            return Err(ReflectError::NotGeneric {
                descriptor: function,
            });
        };
        let shape = self.function_shape(shape_id);
        if shape.generic_arity == 0 {
            return Err(ReflectError::NotGeneric {
                descriptor: function,
            });
        }
        if args.len() != shape.generic_arity as usize {
            return Err(ReflectError::ArityMismatch {
                expected: shape.generic_arity,
                actual: args.len(),
            });
        }

        let placeholders = [DescId::GENERIC_1, DescId::GENERIC_2, DescId::GENERIC_3];
        let pairs: SmallVec<[(DescId, DescId); 3]> = placeholders
            .into_iter()
            .zip(args.iter().copied())
            .collect();
        let params: Vec<DescId> = shape.params.iter().map(|&p| self.swap(p, &pairs)).collect();
        let return_type = self.swap(shape.return_type, &pairs);
        Ok(self.function(params, return_type))
    }

    /// One level of reification: the inner descriptor of a meta descriptor,
    /// or `NEVER` for anything that is not one.
    pub fn reify(&self, descriptor: DescId) -> DescId {
        match self.lookup(descriptor) {
            Some(DescData::Meta(inner)) => inner,
            _ => DescId::NEVER,
        }
    }
}

struct Swapper<'a> {
    engine: &'a DescEngine,
    pairs: &'a [(DescId, DescId)],
    memo: FxHashMap<DescId, DescId>,
}

impl Swapper<'_> {
    fn apply(&mut self, id: DescId) -> DescId {
        // A direct match short-circuits before any recursion.
        if let Some(&(_, to)) = self.pairs.iter().find(|&&(from, _)| from == id) {
            return to;
        }
        if let Some(&done) = self.memo.get(&id) {
            return done;
        }
        let out = self.rewrite(id);
        self.memo.insert(id, out);
        out
    }

    fn rewrite(&mut self, id: DescId) -> DescId {
        let engine = self.engine;
        let Some(data) = engine.lookup(id) else {
            return id;
        };
        match data {
            // Leaves. A brand's token is not a descriptor; substitution
            // never reaches through it.
            DescData::Intrinsic(_) | DescData::Literal(_) | DescData::Brand(_) => id,

            DescData::Array(item) => {
                let swapped = self.apply(item);
                if swapped == item {
                    id
                } else {
                    engine.array(swapped)
                }
            }
            DescData::SetOf(item) => {
                let swapped = self.apply(item);
                if swapped == item {
                    id
                } else {
                    engine.set_of(swapped)
                }
            }
            DescData::MapOf(key, value) => {
                let (k, v) = (self.apply(key), self.apply(value));
                if k == key && v == value {
                    id
                } else {
                    engine.map_of(k, v)
                }
            }
            DescData::Tuple(list) => {
                self.rewrite_members(id, list, |members| engine.tuple(members))
            }
            // Member-wise recursion plus re-canonicalization is exactly the
            // conjunction-distribution rule: a matched conjunct is replaced
            // and the rest re-intersected, refinements intact.
            DescData::Union(list) => {
                self.rewrite_members(id, list, |members| engine.union(members))
            }
            DescData::Intersection(list) => {
                self.rewrite_members(id, list, |members| engine.intersection(members))
            }
            DescData::Record(shape_id) => {
                let shape = engine.record_shape(shape_id);
                let mut changed = false;
                let mut properties = Vec::with_capacity(shape.properties.len());
                for prop in shape.properties.iter() {
                    let value = self.apply(prop.value);
                    changed |= value != prop.value;
                    properties.push(crate::types::PropertyInfo::new(prop.key, value));
                }
                if changed {
                    engine.record_with_flags(properties, shape.flags)
                } else {
                    id
                }
            }
            DescData::Function(shape_id) => {
                let shape = engine.function_shape(shape_id);
                let mut changed = false;
                let mut params = Vec::with_capacity(shape.params.len());
                for &param in shape.params.iter() {
                    let swapped = self.apply(param);
                    changed |= swapped != param;
                    params.push(swapped);
                }
                let return_type = self.apply(shape.return_type);
                changed |= return_type != shape.return_type;
                if changed {
                    engine.function_with_arity(params, return_type, shape.generic_arity)
                } else {
                    id
                }
            }
            DescData::Readonly(inner) => {
                let swapped = self.apply(inner);
                if swapped == inner {
                    id
                } else {
                    engine.readonly(swapped)
                }
            }
            DescData::Meta(inner) => {
                let swapped = self.apply(inner);
                if swapped == inner {
                    id
                } else {
                    engine.meta(swapped)
                }
            }
            DescData::Conditional(shape_id) => {
                let shape = engine.conditional_shape(shape_id);
                let extension = self.apply(shape.extension);
                let base = self.apply(shape.base);
                let yes = self.apply(shape.yes);
                let no = self.apply(shape.no);
                if extension == shape.extension
                    && base == shape.base
                    && yes == shape.yes
                    && no == shape.no
                {
                    id
                } else {
                    engine.conditional(extension, base, yes, no)
                }
            }
            DescData::GuardSig(from, to) => {
                let (f, t) = (self.apply(from), self.apply(to));
                if f == from && t == to {
                    id
                } else {
                    engine.guard_sig(f, t)
                }
            }
        }
    }

    fn rewrite_members(
        &mut self,
        id: DescId,
        list: crate::types::ListId,
        rebuild: impl FnOnce(Vec<DescId>) -> DescId,
    ) -> DescId {
        let members = self.engine.list(list);
        let mut changed = false;
        let mut swapped = Vec::with_capacity(members.len());
        for &member in members.iter() {
            let out = self.apply(member);
            changed |= out != member;
            swapped.push(out);
        }
        if changed { rebuild(swapped) } else { id }
    }
}
