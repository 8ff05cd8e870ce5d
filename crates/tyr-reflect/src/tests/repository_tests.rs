use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::queries;
use crate::repository::{
    CachedRepository, CapabilityRepository, ChainRepository, MapRepository, require,
};
use crate::types::DescId;
use crate::{DescEngine, OpaqueToken, ReflectError};

#[test]
fn test_empty_chain_is_absent() {
    let chain = ChainRepository::<DescId, String>::new();
    assert_eq!(chain.get(DescId::STRING), None);
}

#[test]
fn test_chain_first_definer_wins() {
    let a = MapRepository::new();
    a.add(DescId::STRING, "from-a".to_string());
    let a = Arc::new(a);

    let b: Arc<MapRepository<DescId, String>> = Arc::new(MapRepository::new());

    let a_then_b: Arc<ChainRepository<DescId, String>> = ChainRepository::new();
    a_then_b.add(a.clone());
    a_then_b.add(b.clone());
    assert_eq!(a_then_b.get(DescId::STRING), Some("from-a".to_string()));

    // Registration order does not matter when only one repository defines
    // the capability.
    let b_then_a: Arc<ChainRepository<DescId, String>> = ChainRepository::new();
    b_then_a.add(b);
    b_then_a.add(a);
    assert_eq!(b_then_a.get(DescId::STRING), Some("from-a".to_string()));
}

#[test]
fn test_chain_respects_registration_order_on_conflict() {
    let first = MapRepository::new();
    first.add(DescId::NUMBER, 1u32);
    let second = MapRepository::new();
    second.add(DescId::NUMBER, 2u32);

    let chain: Arc<ChainRepository<DescId, u32>> = ChainRepository::new();
    chain.add(Arc::new(first));
    chain.add(Arc::new(second));
    assert_eq!(chain.get(DescId::NUMBER), Some(1));
}

#[test]
fn test_closure_repository() {
    let chain = ChainRepository::<DescId, &'static str>::new();
    chain.add(Arc::new(|key: DescId| {
        (key == DescId::NEVER).then_some("uninhabited")
    }));
    assert_eq!(chain.get(DescId::NEVER), Some("uninhabited"));
    assert_eq!(chain.get(DescId::STRING), None);
}

#[test]
fn test_loop_repository_recurses_through_chain() {
    // Capability: a display name for a descriptor. The array rule asks the
    // chain itself for the item's name, so lookup recurses through every
    // registered repository.
    let engine = DescEngine::global();

    let leaves = MapRepository::new();
    leaves.add(DescId::NUMBER, "number".to_string());
    leaves.add(DescId::STRING, "string".to_string());

    let chain: Arc<ChainRepository<DescId, String>> = ChainRepository::new();
    chain.add(Arc::new(leaves));
    chain.add_loop(|chain: Arc<ChainRepository<DescId, String>>| {
        move |key: DescId| {
            let item = queries::array_item(engine, key)?;
            let inner = chain.get(item)?;
            Some(format!("array<{inner}>"))
        }
    });

    let nested = engine.array(engine.array(DescId::NUMBER));
    assert_eq!(chain.get(nested), Some("array<array<number>>".to_string()));
    // An unknown leaf stays unresolvable, even through the loop.
    assert_eq!(chain.get(engine.array(DescId::BOOLEAN)), None);
}

#[test]
fn test_cached_repository_resolves_once() {
    let resolutions = Arc::new(AtomicUsize::new(0));
    let counting = {
        let resolutions = resolutions.clone();
        move |key: DescId| {
            resolutions.fetch_add(1, Ordering::SeqCst);
            (key == DescId::STRING).then(|| "text".to_string())
        }
    };

    let cached: CachedRepository<DescId, String> = CachedRepository::new(Arc::new(counting));
    assert_eq!(cached.get(DescId::STRING), Some("text".to_string()));
    assert_eq!(cached.get(DescId::STRING), Some("text".to_string()));
    assert_eq!(resolutions.load(Ordering::SeqCst), 1);

    // Absence is not cached; later registrations may fill it in.
    assert_eq!(cached.get(DescId::NUMBER), None);
    assert_eq!(cached.get(DescId::NUMBER), None);
    assert_eq!(resolutions.load(Ordering::SeqCst), 3);
}

#[test]
fn test_pairwise_repository_keys() {
    // Transform-style consumers key capabilities by (from, to) pairs.
    let transforms: MapRepository<(DescId, DescId), &'static str> = MapRepository::new();
    transforms.add((DescId::NUMBER, DescId::STRING), "stringify");

    let chain: Arc<ChainRepository<(DescId, DescId), &'static str>> = ChainRepository::new();
    chain.add(Arc::new(transforms));
    assert_eq!(
        chain.get((DescId::NUMBER, DescId::STRING)),
        Some("stringify")
    );
    assert_eq!(chain.get((DescId::STRING, DescId::NUMBER)), None);
}

#[test]
fn test_require_names_descriptor_and_key() {
    let repo: MapRepository<DescId, &'static str> = MapRepository::new();
    repo.add(DescId::STRING, "text");

    assert_eq!(require(&repo, DescId::STRING, None), Ok("text"));

    let key = OpaqueToken::labelled("primary");
    assert_eq!(
        require(&repo, DescId::NUMBER, Some(key)),
        Err(ReflectError::Resolution {
            descriptor: DescId::NUMBER,
            key: Some(key)
        })
    );
}
