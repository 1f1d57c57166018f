//! Integration Tests for the Store API
//!
//! Exercises the public surface end to end, including the background sweeper.

use std::collections::HashSet;
use std::time::Duration;

use kvs_memory::{ConfigError, ErrorKind, Lifetime, Store, StoreConfig, StoreRegistry};
use tokio::time::sleep;
use tokio_test::{assert_err, assert_ok};

// == Helper Functions ==

/// Store with the given TTL whose sweeper does not fire during the test.
fn create_lazy_store(max_size: usize, ttl_ms: u64) -> Store<String, String> {
    let config = StoreConfig::default()
        .with_name("myStore")
        .with_max_size(max_size)
        .with_item_ttl(Duration::from_millis(ttl_ms))
        .with_sweep_interval(Duration::from_secs(3600));
    assert_ok!(Store::new(config))
}

fn s(v: &str) -> String {
    v.to_string()
}

// == Creation Tests ==

#[tokio::test]
async fn test_default_store_uses_defaults() {
    let store: Store<String, String> = assert_ok!(Store::new(StoreConfig::default()));
    let info = store.info();

    assert!(info.name.starts_with("kvs-"));
    assert_eq!(info.size, 0);
    assert_eq!(info.max_size, 10_000);
    assert_eq!(info.item_ttl, Duration::from_millis(300_000));
}

#[tokio::test]
async fn test_store_from_json_options() {
    let config = assert_ok!(StoreConfig::from_json(
        r#"{"name":"myStore","maxSize":100,"itemTTL":5000}"#
    ));
    let store: Store<String, String> = assert_ok!(Store::new(config));

    let json = serde_json::to_value(store.info()).unwrap();
    assert_eq!(json["name"], "myStore");
    assert_eq!(json["size"], 0);
    assert_eq!(json["maxSize"], 100);
    assert_eq!(json["itemTTL"], 5000);
}

#[tokio::test]
async fn test_invalid_options_fail_before_store_exists() {
    let registry = StoreRegistry::new();

    let result: Result<Store<String, String>, _> =
        registry.create(StoreConfig::default().with_item_ttl(Duration::ZERO));
    assert!(matches!(result, Err(ConfigError::InvalidItemTtl(0))));

    assert!(matches!(
        StoreConfig::from_json(r#"{"maxSize": -10}"#),
        Err(ConfigError::InvalidMaxSize(-10))
    ));
    assert_eq!(registry.count(), 0);
}

// == Insert / Upsert Tests ==

#[tokio::test]
async fn test_distinct_inserts_grow_size() {
    let store = create_lazy_store(100, 5000);

    for n in 0..25 {
        assert_ok!(store.insert(format!("key{}", n), s("value")));
    }

    assert_eq!(store.info().size, 25);
}

#[tokio::test]
async fn test_capacity_scenario() {
    let store = create_lazy_store(1, 5000);

    assert_ok!(store.insert(s("a"), s("1")));
    let err = assert_err!(store.insert(s("b"), s("2")));
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);

    assert_ok!(store.upsert(s("a"), s("new")));
    assert_eq!(store.info().size, 1);
    assert_eq!(assert_ok!(store.get(&s("a"))), (s("new"), Lifetime::Volatile));
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_insert_fails_even_when_expired() {
    let store = create_lazy_store(100, 100);

    assert_ok!(store.insert(s("k"), s("v")));
    assert_eq!(
        assert_err!(store.insert(s("k"), s("v"))).kind(),
        ErrorKind::AlreadyExists
    );

    sleep(Duration::from_millis(250)).await;
    assert_eq!(
        assert_err!(store.insert(s("k"), s("v"))).kind(),
        ErrorKind::AlreadyExists
    );
}

// == Get / Expiration Tests ==

#[tokio::test(start_paused = true)]
async fn test_get_extends_expiration_by_full_ttl() {
    let store = create_lazy_store(100, 100);
    assert_ok!(store.insert(s("k"), s("v")));

    // Each read lands before the previous expiration and pushes it out
    for _ in 0..5 {
        sleep(Duration::from_millis(80)).await;
        assert_eq!(assert_ok!(store.get(&s("k"))).0, "v");
    }

    sleep(Duration::from_millis(101)).await;
    assert_eq!(assert_err!(store.get(&s("k"))).kind(), ErrorKind::NotFound);
}

#[tokio::test(start_paused = true)]
async fn test_expired_item_counts_until_removed() {
    let store = create_lazy_store(100, 100);
    assert_ok!(store.insert(s("k"), s("v")));

    sleep(Duration::from_millis(200)).await;

    assert_eq!(assert_err!(store.get(&s("k"))).kind(), ErrorKind::NotFound);
    assert_eq!(store.info().size, 1);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_scenario_with_sweeper() {
    let config = StoreConfig::default()
        .with_max_size(100)
        .with_item_ttl(Duration::from_millis(100));
    let store: Store<String, String> = assert_ok!(Store::new(config));

    assert_ok!(store.insert(s("k1"), s("v1")));

    sleep(Duration::from_millis(250)).await;
    assert_eq!(assert_err!(store.get(&s("k1"))).kind(), ErrorKind::NotFound);

    sleep(Duration::from_millis(2250)).await;
    assert_eq!(store.info().size, 0);
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_keeps_permanent_items() {
    let config = StoreConfig::default().with_item_ttl(Duration::from_millis(100));
    let store: Store<String, String> = assert_ok!(Store::new(config));

    assert_ok!(store.insert_with_lifetime(s("perm"), s("v"), Lifetime::Permanent));
    assert_ok!(store.insert(s("vol"), s("v")));

    sleep(Duration::from_secs(3)).await;

    assert_eq!(store.info().size, 1);
    assert_eq!(assert_ok!(store.get(&s("perm"))).1, Lifetime::Permanent);
}

// == Delete Tests ==

#[tokio::test(start_paused = true)]
async fn test_delete_rules() {
    let store = create_lazy_store(100, 100);

    assert_ok!(store.insert_with_lifetime(s("perm"), s("v"), Lifetime::Permanent));
    assert_ok!(store.insert(s("stale"), s("v")));
    sleep(Duration::from_millis(200)).await;
    assert_ok!(store.insert(s("fresh"), s("v")));

    assert_eq!(
        assert_err!(store.delete(&s("perm"))).kind(),
        ErrorKind::ProtectedItem
    );
    assert_eq!(
        assert_err!(store.delete(&s("missing"))).kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        assert_err!(store.delete(&s("stale"))).kind(),
        ErrorKind::NotFound
    );

    let before = store.info().size;
    assert_ok!(store.delete(&s("fresh")));
    assert_eq!(store.info().size, before - 1);
}

// == Clear Tests ==

#[tokio::test(start_paused = true)]
async fn test_clear_keeps_only_permanent_items() {
    let store = create_lazy_store(100, 100);

    assert_ok!(store.insert_with_lifetime(s("p1"), s("v"), Lifetime::Permanent));
    assert_ok!(store.insert_with_lifetime(s("p2"), s("v"), Lifetime::Permanent));
    assert_ok!(store.insert(s("stale"), s("v")));
    sleep(Duration::from_millis(200)).await;
    assert_ok!(store.insert(s("fresh"), s("v")));

    store.clear();

    assert_eq!(store.info().size, 2);
    let keys: HashSet<String> = store.iter().map(|(k, _, _)| k).collect();
    assert_eq!(keys, HashSet::from([s("p1"), s("p2")]));
}

// == Iterate Tests ==

#[tokio::test(start_paused = true)]
async fn test_iterate_scenario() {
    let store = create_lazy_store(100, 100);

    assert_ok!(store.insert_with_lifetime(s("A"), s("a"), Lifetime::Permanent));
    assert_ok!(store.insert(s("C"), s("c")));
    sleep(Duration::from_millis(200)).await;
    assert_ok!(store.insert(s("B"), s("b")));

    let entries: HashSet<(String, String, Lifetime)> = store.iter().collect();
    assert_eq!(
        entries,
        HashSet::from([
            (s("A"), s("a"), Lifetime::Permanent),
            (s("B"), s("b"), Lifetime::Volatile),
        ])
    );
}

// == Metrics Tests ==

#[tokio::test]
async fn test_metrics_reset_counters_but_not_state() {
    let store = create_lazy_store(100, 5000);

    assert_ok!(store.insert(s("key"), s("value")));
    assert_ok!(store.insert(s("key2"), s("value2")));
    let _ = store.get(&s("missing"));

    let first = store.metrics();
    assert_eq!(first.operations.insert, 2);
    assert_eq!(first.operations.get, 1);

    let second = store.metrics();
    assert_eq!(second.name, "myStore");
    assert_eq!(second.size, 2);
    assert_eq!(second.max_size, 100);
    assert_eq!(second.operations.total(), 0);

    let json = serde_json::to_value(&second).unwrap();
    for op in ["insert", "upsert", "get", "del", "clear"] {
        assert_eq!(json["operations"][op], 0);
    }
}
