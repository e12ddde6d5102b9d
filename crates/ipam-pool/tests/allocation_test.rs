//! End-to-end allocation scenarios against the in-memory store.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;

use ipam_constants::pool::ALLOW_GATEWAY_ASSIGNMENT_OPTION;
use ipam_kv_types::KeyValueStoreError;
use ipam_pool::AddressAllocator;
use ipam_pool::AddressRequest;
use ipam_pool::IpamError;
use ipam_pool::Pool;
use ipam_pool::PoolOptions;
use ipam_pool::PoolRegistry;
use ipam_testing::ContendedKeyValueStore;
use ipam_testing::DeterministicKeyValueStore;
use ipam_testing::FaultTarget;
use ipam_testing::FaultyKeyValueStore;
use ipam_traits::KeyValueStore;

const NS: &str = "/ipam";

fn engine<S: KeyValueStore + ?Sized + 'static>(store: Arc<S>) -> (PoolRegistry<S>, AddressAllocator<S>) {
    (PoolRegistry::new(store.clone(), NS), AddressAllocator::new(store, NS))
}

async fn create<S: KeyValueStore + ?Sized + 'static>(registry: &PoolRegistry<S>, cidr: &str) -> Pool {
    registry.create_pool("net1", cidr.parse().unwrap(), PoolOptions::new()).await.unwrap()
}

fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_create_pool_idempotent() {
    let (registry, _) = engine(DeterministicKeyValueStore::new());
    let first = create(&registry, "10.0.1.0/24").await;
    let second = create(&registry, "10.0.1.0/24").await;
    assert_eq!(first, second);
    assert_eq!(registry.get_pool("net1").await.unwrap(), first);
}

#[tokio::test]
async fn test_slash_24_fills_in_order_then_exhausts() {
    let (registry, allocator) = engine(DeterministicKeyValueStore::new());
    let pool = create(&registry, "10.0.1.0/24").await;

    let mut seen = HashSet::new();
    for host in 1..=253u8 {
        let got = allocator.reserve_free_ip(&pool).await.unwrap();
        assert_eq!(got.addr(), Ipv4Addr::new(10, 0, 1, host));
        assert_eq!(got.prefix_len(), 24);
        assert!(seen.insert(got.addr()));
    }

    // .254 is the last usable host; .255 is broadcast
    assert_eq!(allocator.reserve_free_ip(&pool).await.unwrap().to_string(), "10.0.1.254/24");
    let err = allocator.reserve_free_ip(&pool).await.unwrap_err();
    assert!(matches!(err, IpamError::PoolExhausted { .. }));
}

#[tokio::test]
async fn test_slash_28_release_makes_address_eligible_again() {
    let (registry, allocator) = engine(DeterministicKeyValueStore::new());
    let pool = create(&registry, "10.0.1.0/28").await;

    for _ in 0..14 {
        allocator.reserve_free_ip(&pool).await.unwrap();
    }
    assert!(matches!(
        allocator.reserve_free_ip(&pool).await,
        Err(IpamError::PoolExhausted { .. })
    ));

    allocator.release_ip("net1", ip("10.0.1.3")).await.unwrap();
    assert_eq!(allocator.reserve_free_ip(&pool).await.unwrap().to_string(), "10.0.1.3/28");

    assert!(matches!(
        allocator.reserve_free_ip(&pool).await,
        Err(IpamError::PoolExhausted { .. })
    ));
}

#[tokio::test]
async fn test_gateway_bypass_scenario() {
    let (registry, allocator) = engine(DeterministicKeyValueStore::new());
    let mut options = PoolOptions::new();
    options.insert(ALLOW_GATEWAY_ASSIGNMENT_OPTION.to_string(), "true".to_string());
    let pool = registry.create_pool("net1", "10.0.1.0/24".parse().unwrap(), options).await.unwrap();
    let gateway = ip("10.0.1.1");

    // Bypass twice; nothing is recorded
    for _ in 0..2 {
        let got = allocator.allocate(&pool, AddressRequest::gateway(Some(gateway))).await.unwrap();
        assert_eq!(got.to_string(), "10.0.1.1/24");
    }

    // The first normal reservation still wins, the next one collides
    allocator.allocate(&pool, AddressRequest::fixed(gateway)).await.unwrap();
    let err = allocator.allocate(&pool, AddressRequest::fixed(gateway)).await.unwrap_err();
    assert!(matches!(err, IpamError::AddressInUse { .. }));
}

#[tokio::test]
async fn test_dont_reserve_does_not_block_reserve() {
    let (registry, allocator) = engine(DeterministicKeyValueStore::new());
    let pool = create(&registry, "10.0.1.0/24").await;

    allocator.dont_reserve_ip(&pool, ip("10.0.1.1"));
    allocator.reserve_ip(&pool, ip("10.0.1.1")).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reserve_ip_exactly_one_wins() {
    let store = DeterministicKeyValueStore::new();
    let (registry, allocator) = engine(store);
    let pool = create(&registry, "10.0.1.0/24").await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let allocator = allocator.clone();
        let pool = pool.clone();
        handles.push(tokio::spawn(async move { allocator.reserve_ip(&pool, Ipv4Addr::new(10, 0, 1, 42)).await }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(IpamError::AddressInUse { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(wins, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_free_allocation_never_duplicates() {
    let store = DeterministicKeyValueStore::new();
    let (registry, allocator) = engine(store);
    let pool = create(&registry, "10.0.1.0/27").await;

    let mut handles = Vec::new();
    for _ in 0..40 {
        let allocator = allocator.clone();
        let pool = pool.clone();
        handles.push(tokio::spawn(async move { allocator.reserve_free_ip(&pool).await }));
    }

    let mut addresses = HashSet::new();
    let mut exhausted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(addr) => assert!(addresses.insert(addr.addr()), "duplicate {addr}"),
            Err(IpamError::PoolExhausted { .. }) => exhausted += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    // 30 usable hosts in a /27
    assert_eq!(addresses.len(), 30);
    assert_eq!(exhausted, 10);
}

#[tokio::test]
async fn test_free_allocation_advances_past_stolen_candidates() {
    let backing = DeterministicKeyValueStore::new();
    let store = ContendedKeyValueStore::new(backing.clone());
    let (registry, allocator) = engine(store.clone());
    let pool = create(&registry, "10.0.1.0/24").await;

    store.steal_next(2);
    let got = allocator.reserve_free_ip(&pool).await.unwrap();

    assert_eq!(got.to_string(), "10.0.1.3/24");
    assert_eq!(store.stolen_keys(), vec![
        "/ipam/pool/net1/allocated/10.0.1.1".to_string(),
        "/ipam/pool/net1/allocated/10.0.1.2".to_string(),
    ]);
}

#[tokio::test]
async fn test_store_timeout_surfaces_as_unavailable() {
    let store = FaultyKeyValueStore::new(DeterministicKeyValueStore::new());
    let (registry, allocator) = engine(store.clone());
    let pool = create(&registry, "10.0.1.0/24").await;

    store.fail(FaultTarget::Scans, KeyValueStoreError::Timeout { duration_ms: 1000 });
    let err = allocator.reserve_free_ip(&pool).await.unwrap_err();
    assert!(matches!(err, IpamError::StoreUnavailable { .. }));

    store.fail(FaultTarget::Reads, KeyValueStoreError::NotLeader {
        leader: None,
        reason: "election in progress".into(),
    });
    assert!(matches!(
        registry.get_pool("net1").await,
        Err(IpamError::StoreUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_mid_scan_failure_aborts_without_rollback() {
    let backing = DeterministicKeyValueStore::new();
    let faulty = FaultyKeyValueStore::new(backing.clone());
    let contended = ContendedKeyValueStore::new(faulty.clone());
    let (registry, allocator) = engine(contended.clone());
    let pool = create(&registry, "10.0.1.0/24").await;

    // First candidate is lost to a competitor, then the store goes away
    contended.steal_next(1);
    faulty.fail_after(FaultTarget::Writes, 2, KeyValueStoreError::Unavailable {
        reason: "partitioned".into(),
    });

    let err = allocator.reserve_free_ip(&pool).await.unwrap_err();
    assert!(matches!(err, IpamError::StoreUnavailable { .. }));

    faulty.heal();
    // The competitor's reservation stays; nothing else was written
    assert_eq!(backing.keys_with_prefix("/ipam/pool/net1/allocated/").await, vec![
        "/ipam/pool/net1/allocated/10.0.1.1".to_string()
    ]);
    assert_eq!(allocator.reserve_free_ip(&pool).await.unwrap().to_string(), "10.0.1.2/24");
}

#[tokio::test]
async fn test_reused_pool_name_starts_clean_after_delete() {
    let (registry, allocator) = engine(DeterministicKeyValueStore::new());
    let pool = create(&registry, "10.0.1.0/24").await;
    allocator.reserve_ip(&pool, ip("10.0.1.1")).await.unwrap();

    registry.delete_pool("net1").await.unwrap();
    let pool = create(&registry, "10.0.1.0/24").await;

    assert_eq!(allocator.reserve_free_ip(&pool).await.unwrap().to_string(), "10.0.1.1/24");
}

#[tokio::test]
async fn test_pools_are_isolated() {
    let (registry, allocator) = engine(DeterministicKeyValueStore::new());
    let a = registry.create_pool("a", "10.0.1.0/30".parse().unwrap(), PoolOptions::new()).await.unwrap();
    let b = registry.create_pool("b", "10.0.1.0/30".parse().unwrap(), PoolOptions::new()).await.unwrap();

    allocator.reserve_free_ip(&a).await.unwrap();
    allocator.reserve_free_ip(&a).await.unwrap();
    assert!(allocator.reserve_free_ip(&a).await.is_err());

    assert_eq!(allocator.reserve_free_ip(&b).await.unwrap().to_string(), "10.0.1.1/30");
}

#[tokio::test]
async fn test_scan_not_found_treated_as_empty_pool() {
    let store = FaultyKeyValueStore::new(DeterministicKeyValueStore::new());
    let (registry, allocator) = engine(store.clone());
    let pool = create(&registry, "10.0.1.0/24").await;

    store.fail(FaultTarget::Scans, KeyValueStoreError::NotFound {
        key: "/ipam/pool/net1/allocated/".into(),
    });

    assert_eq!(allocator.reserve_free_ip(&pool).await.unwrap().to_string(), "10.0.1.1/24");
    assert!(store.injected_failures() >= 1);
}

#[tokio::test]
async fn test_purge_with_scan_not_found_removes_nothing() {
    let store = FaultyKeyValueStore::new(DeterministicKeyValueStore::new());
    let (registry, _) = engine(store.clone());
    create(&registry, "10.0.1.0/24").await;

    store.fail(FaultTarget::Scans, KeyValueStoreError::NotFound {
        key: "/ipam/pool/net1/allocated/".into(),
    });

    assert_eq!(registry.purge_reservations("net1").await.unwrap(), 0);
    registry.delete_pool("net1").await.unwrap();
    assert!(matches!(registry.get_pool("net1").await, Err(IpamError::PoolNotFound { .. })));
}
