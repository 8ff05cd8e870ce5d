//! Descriptor content queries.
//!
//! Read-only accessors that abstract away the internal [`DescData`]
//! representation so consuming subsystems (guards, transformers, dependency
//! resolution) can dispatch on variants without matching on `DescData`
//! directly, and without ever seeing the interning internals.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tyr_common::OpaqueToken;

use crate::intern::DescEngine;
use crate::types::{
    ConditionalShape, DescData, DescId, FunctionShape, PropertyInfo, RecordFlags,
};

pub fn is_record(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Record(_)))
}

pub fn is_array(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Array(_)))
}

pub fn is_tuple(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Tuple(_)))
}

pub fn is_union(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Union(_)))
}

pub fn is_intersection(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Intersection(_)))
}

pub fn is_function(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Function(_)))
}

pub fn is_brand(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Brand(_)))
}

pub fn is_readonly(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Readonly(_)))
}

pub fn is_meta(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Meta(_)))
}

pub fn is_conditional(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Conditional(_)))
}

pub fn is_literal(engine: &DescEngine, id: DescId) -> bool {
    matches!(engine.lookup(id), Some(DescData::Literal(_)))
}

/// True for the reserved substitution targets (`SOURCE`, `GENERIC_1..3`).
pub fn is_placeholder(id: DescId) -> bool {
    matches!(
        id,
        DescId::SOURCE | DescId::GENERIC_1 | DescId::GENERIC_2 | DescId::GENERIC_3
    )
}

/// Sorted property list of a record.
pub fn record_properties(engine: &DescEngine, id: DescId) -> Option<Arc<[PropertyInfo]>> {
    match engine.lookup(id)? {
        DescData::Record(shape_id) => Some(engine.record_shape(shape_id).properties),
        _ => None,
    }
}

pub fn record_flags(engine: &DescEngine, id: DescId) -> Option<RecordFlags> {
    match engine.lookup(id)? {
        DescData::Record(shape_id) => Some(engine.record_shape(shape_id).flags),
        _ => None,
    }
}

pub fn array_item(engine: &DescEngine, id: DescId) -> Option<DescId> {
    match engine.lookup(id)? {
        DescData::Array(item) => Some(item),
        _ => None,
    }
}

pub fn set_item(engine: &DescEngine, id: DescId) -> Option<DescId> {
    match engine.lookup(id)? {
        DescData::SetOf(item) => Some(item),
        _ => None,
    }
}

/// `(key, value)` descriptors of a map.
pub fn map_parts(engine: &DescEngine, id: DescId) -> Option<(DescId, DescId)> {
    match engine.lookup(id)? {
        DescData::MapOf(key, value) => Some((key, value)),
        _ => None,
    }
}

pub fn tuple_members(engine: &DescEngine, id: DescId) -> Option<Arc<[DescId]>> {
    match engine.lookup(id)? {
        DescData::Tuple(list) => Some(engine.list(list)),
        _ => None,
    }
}

pub fn union_members(engine: &DescEngine, id: DescId) -> Option<Arc<[DescId]>> {
    match engine.lookup(id)? {
        DescData::Union(list) => Some(engine.list(list)),
        _ => None,
    }
}

pub fn intersection_members(engine: &DescEngine, id: DescId) -> Option<Arc<[DescId]>> {
    match engine.lookup(id)? {
        DescData::Intersection(list) => Some(engine.list(list)),
        _ => None,
    }
}

pub fn function_parts(engine: &DescEngine, id: DescId) -> Option<FunctionShape> {
    match engine.lookup(id)? {
        DescData::Function(shape_id) => Some(engine.function_shape(shape_id)),
        _ => None,
    }
}

pub fn brand_token(engine: &DescEngine, id: DescId) -> Option<OpaqueToken> {
    match engine.lookup(id)? {
        DescData::Brand(token) => Some(token),
        _ => None,
    }
}

pub fn readonly_inner(engine: &DescEngine, id: DescId) -> Option<DescId> {
    match engine.lookup(id)? {
        DescData::Readonly(inner) => Some(inner),
        _ => None,
    }
}

pub fn meta_inner(engine: &DescEngine, id: DescId) -> Option<DescId> {
    match engine.lookup(id)? {
        DescData::Meta(inner) => Some(inner),
        _ => None,
    }
}

pub fn conditional_parts(engine: &DescEngine, id: DescId) -> Option<ConditionalShape> {
    match engine.lookup(id)? {
        DescData::Conditional(shape_id) => Some(engine.conditional_shape(shape_id)),
        _ => None,
    }
}

/// `(from, to)` descriptors of a guard signature.
pub fn guard_sig_parts(engine: &DescEngine, id: DescId) -> Option<(DescId, DescId)> {
    match engine.lookup(id)? {
        DescData::GuardSig(from, to) => Some((from, to)),
        _ => None,
    }
}

/// Visit every direct child descriptor of `id`, in payload order. Brand
/// tokens are not descriptors and are not visited.
pub fn for_each_child(engine: &DescEngine, id: DescId, mut visit: impl FnMut(DescId)) {
    let Some(data) = engine.lookup(id) else {
        return;
    };
    match data {
        DescData::Intrinsic(_) | DescData::Literal(_) | DescData::Brand(_) => {}
        DescData::Array(item) | DescData::SetOf(item) => visit(item),
        DescData::MapOf(key, value) => {
            visit(key);
            visit(value);
        }
        DescData::Tuple(list) | DescData::Union(list) | DescData::Intersection(list) => {
            for &member in engine.list(list).iter() {
                visit(member);
            }
        }
        DescData::Record(shape_id) => {
            for prop in engine.record_shape(shape_id).properties.iter() {
                visit(prop.value);
            }
        }
        DescData::Function(shape_id) => {
            let shape = engine.function_shape(shape_id);
            for &param in shape.params.iter() {
                visit(param);
            }
            visit(shape.return_type);
        }
        DescData::Readonly(inner) | DescData::Meta(inner) => visit(inner),
        DescData::Conditional(shape_id) => {
            let shape = engine.conditional_shape(shape_id);
            visit(shape.extension);
            visit(shape.base);
            visit(shape.yes);
            visit(shape.no);
        }
        DescData::GuardSig(from, to) => {
            visit(from);
            visit(to);
        }
    }
}

/// Whether `needle` occurs anywhere in `haystack`'s graph (the root
/// included). Shared sub-graphs are visited once.
pub fn contains_descriptor(engine: &DescEngine, haystack: DescId, needle: DescId) -> bool {
    let mut visited: FxHashSet<DescId> = FxHashSet::default();
    let mut stack = vec![haystack];
    while let Some(id) = stack.pop() {
        if id == needle {
            return true;
        }
        if !visited.insert(id) {
            continue;
        }
        for_each_child(engine, id, |child| stack.push(child));
    }
    false
}
