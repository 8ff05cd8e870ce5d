use crate::queries;
use crate::types::*;
use crate::{DescEngine, OpaqueToken, ReflectError};

#[test]
fn test_swap_miss_returns_same_handle() {
    let engine = DescEngine::new();

    let record = engine.record(vec![
        PropertyInfo::text(engine.intern_string("x"), DescId::STRING),
        PropertyInfo::text(engine.intern_string("y"), DescId::NUMBER),
    ]);
    let swapped = engine.swap_one(record, DescId::GENERIC_1, DescId::BOOLEAN);
    assert_eq!(swapped, record);
}

#[test]
fn test_swap_record_interns_like_fresh_construction() {
    let engine = DescEngine::new();

    let x = engine.intern_string("x");
    let y = engine.intern_string("y");
    let template = engine.record(vec![
        PropertyInfo::text(x, DescId::GENERIC_1),
        PropertyInfo::text(y, DescId::STRING),
    ]);

    let swapped = engine.swap_one(template, DescId::GENERIC_1, DescId::NUMBER);
    let fresh = engine.record(vec![
        PropertyInfo::text(x, DescId::NUMBER),
        PropertyInfo::text(y, DescId::STRING),
    ]);
    assert_eq!(swapped, fresh);
    assert_ne!(swapped, template);
}

#[test]
fn test_swap_shares_untouched_subtrees() {
    let engine = DescEngine::new();

    let untouched = engine.record(vec![PropertyInfo::text(
        engine.intern_string("deep"),
        DescId::STRING,
    )]);
    let root = engine.tuple(vec![untouched, DescId::GENERIC_1]);

    let swapped = engine.swap_one(root, DescId::GENERIC_1, DescId::NUMBER);
    assert_ne!(swapped, root);
    let members = queries::tuple_members(&engine, swapped).unwrap();
    // The subtree the substitution never touched is the same handle.
    assert_eq!(members[0], untouched);
    assert_eq!(members[1], DescId::NUMBER);
}

#[test]
fn test_swap_preserves_record_flags() {
    let engine = DescEngine::new();

    let optional = engine.optional_record(vec![PropertyInfo::text(
        engine.intern_string("x"),
        DescId::GENERIC_1,
    )]);
    let swapped = engine.swap_one(optional, DescId::GENERIC_1, DescId::NUMBER);
    assert_eq!(
        queries::record_flags(&engine, swapped),
        Some(RecordFlags::OPTIONAL_PROPS)
    );
}

#[test]
fn test_swap_conjunction_distribution() {
    let engine = DescEngine::new();

    let brand = engine.brand(OpaqueToken::labelled("refined"));
    let refined_placeholder = engine.intersection(vec![brand, DescId::GENERIC_1]);

    let swapped = engine.swap_one(refined_placeholder, DescId::GENERIC_1, DescId::NUMBER);
    let expected = engine.intersection(vec![brand, DescId::NUMBER]);
    assert_eq!(swapped, expected);
}

#[test]
fn test_swap_direct_brand_target() {
    let engine = DescEngine::new();

    let brand = engine.brand(OpaqueToken::new());
    // A brand is never recursed into, but a direct match still replaces it.
    assert_eq!(engine.swap_one(brand, brand, DescId::STRING), DescId::STRING);
    assert_eq!(engine.swap_one(brand, DescId::GENERIC_1, DescId::STRING), brand);
}

#[test]
fn test_swap_multiple_pairs() {
    let engine = DescEngine::new();

    let fun = engine.function(
        vec![DescId::GENERIC_1, DescId::GENERIC_2],
        DescId::GENERIC_2,
    );
    let swapped = engine.swap(
        fun,
        &[
            (DescId::GENERIC_1, DescId::STRING),
            (DescId::GENERIC_2, DescId::NUMBER),
        ],
    );
    let expected = engine.function(vec![DescId::STRING, DescId::NUMBER], DescId::NUMBER);
    assert_eq!(swapped, expected);
}

#[test]
fn test_swap_first_matching_pair_wins() {
    let engine = DescEngine::new();

    let swapped = engine.swap(
        DescId::GENERIC_1,
        &[
            (DescId::GENERIC_1, DescId::STRING),
            (DescId::GENERIC_1, DescId::NUMBER),
        ],
    );
    assert_eq!(swapped, DescId::STRING);
}

#[test]
fn test_swap_through_wrappers() {
    let engine = DescEngine::new();

    let ro = engine.readonly(engine.array(DescId::GENERIC_1));
    assert_eq!(
        engine.swap_one(ro, DescId::GENERIC_1, DescId::NUMBER),
        engine.readonly(engine.array(DescId::NUMBER))
    );

    let meta = engine.meta(DescId::GENERIC_1);
    assert_eq!(
        engine.swap_one(meta, DescId::GENERIC_1, DescId::STRING),
        engine.meta(DescId::STRING)
    );

    let sig = engine.guard_sig(DescId::UNKNOWN, DescId::GENERIC_1);
    assert_eq!(
        engine.swap_one(sig, DescId::GENERIC_1, DescId::STRING),
        engine.guard_sig(DescId::UNKNOWN, DescId::STRING)
    );

    let cond = engine.conditional(
        DescId::GENERIC_1,
        DescId::UNKNOWN,
        DescId::GENERIC_1,
        DescId::NEVER,
    );
    assert_eq!(
        engine.swap_one(cond, DescId::GENERIC_1, DescId::STRING),
        engine.conditional(DescId::STRING, DescId::UNKNOWN, DescId::STRING, DescId::NEVER)
    );
}

#[test]
fn test_swap_through_collections() {
    let engine = DescEngine::new();

    let map = engine.map_of(DescId::STRING, engine.set_of(DescId::GENERIC_1));
    assert_eq!(
        engine.swap_one(map, DescId::GENERIC_1, DescId::NUMBER),
        engine.map_of(DescId::STRING, engine.set_of(DescId::NUMBER))
    );

    let union = engine.union(vec![DescId::NULL, engine.array(DescId::GENERIC_1)]);
    assert_eq!(
        engine.swap_one(union, DescId::GENERIC_1, DescId::NUMBER),
        engine.union(vec![DescId::NULL, engine.array(DescId::NUMBER)])
    );
}

#[test]
fn test_swap_shared_subgraph_rewrites_consistently() {
    let engine = DescEngine::new();

    // Diamond: both tuple slots share one sub-graph.
    let shared = engine.array(DescId::GENERIC_1);
    let root = engine.tuple(vec![shared, shared]);

    let swapped = engine.swap_one(root, DescId::GENERIC_1, DescId::STRING);
    let members = queries::tuple_members(&engine, swapped).unwrap();
    assert_eq!(members[0], members[1]);
    assert_eq!(members[0], engine.array(DescId::STRING));
}

#[test]
fn test_contains_descriptor() {
    let engine = DescEngine::new();

    let nested = engine.record(vec![PropertyInfo::text(
        engine.intern_string("inner"),
        engine.array(DescId::GENERIC_1),
    )]);
    assert!(queries::contains_descriptor(&engine, nested, DescId::GENERIC_1));
    assert!(!queries::contains_descriptor(&engine, nested, DescId::GENERIC_2));
    assert!(queries::contains_descriptor(&engine, nested, nested));
}

#[test]
fn test_instantiate_single_generic() {
    let engine = DescEngine::new();

    // <T>(count: number, item: T) => T[]
    let repeat = engine.single_generic_function(
        vec![DescId::NUMBER, DescId::GENERIC_1],
        engine.array(DescId::GENERIC_1),
    );
    let of_strings = engine.instantiate(repeat, &[DescId::STRING]).unwrap();
    let expected = engine.function(
        vec![DescId::NUMBER, DescId::STRING],
        engine.array(DescId::STRING),
    );
    assert_eq!(of_strings, expected);

    let shape = queries::function_parts(&engine, of_strings).unwrap();
    assert_eq!(shape.generic_arity, 0);
}

#[test]
fn test_instantiate_triple_generic() {
    let engine = DescEngine::new();

    let fun = engine.triple_generic_function(
        vec![DescId::GENERIC_1, DescId::GENERIC_2],
        DescId::GENERIC_3,
    );
    let instantiated = engine
        .instantiate(fun, &[DescId::STRING, DescId::NUMBER, DescId::BOOLEAN])
        .unwrap();
    assert_eq!(
        instantiated,
        engine.function(vec![DescId::STRING, DescId::NUMBER], DescId::BOOLEAN)
    );
}

#[test]
fn test_instantiate_rejects_misuse() {
    let engine = DescEngine::new();

    let plain = engine.function(vec![DescId::STRING], DescId::NUMBER);
    assert_eq!(
        engine.instantiate(plain, &[DescId::STRING]),
        Err(ReflectError::NotGeneric { descriptor: plain })
    );
    assert_eq!(
        engine.instantiate(DescId::STRING, &[DescId::STRING]),
        Err(ReflectError::NotGeneric {
            descriptor: DescId::STRING
        })
    );

    let generic = engine.single_generic_function(vec![DescId::GENERIC_1], DescId::GENERIC_1);
    assert_eq!(
        engine.instantiate(generic, &[DescId::STRING, DescId::NUMBER]),
        Err(ReflectError::ArityMismatch {
            expected: 1,
            actual: 2
        })
    );
}

#[test]
fn test_reify() {
    let engine = DescEngine::new();

    let meta = engine.meta(DescId::STRING);
    assert_eq!(engine.reify(meta), DescId::STRING);
    // One level only: reifying a non-meta descriptor is uninhabited.
    assert_eq!(engine.reify(DescId::STRING), DescId::NEVER);
    assert_eq!(engine.reify(engine.reify(meta)), DescId::NEVER);
}
