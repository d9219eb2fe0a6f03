use std::time::Duration;

use redis_connection::{
    CounterOp, JsonStoreExt, KeyValueStore, MemoryStore, SwapOutcome,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Doc {
    status: String,
    owner: String,
}

fn doc(status: &str) -> Doc {
    Doc {
        status: status.to_string(),
        owner: "u1".to_string(),
    }
}

#[tokio::test]
async fn test_set_get_round_trip() {
    let store = MemoryStore::new();

    store
        .set_json_ex("k", &doc("PENDING"), Duration::from_secs(60))
        .await
        .unwrap();

    let loaded: Option<Doc> = store.get_json("k").await.unwrap();
    assert_eq!(loaded, Some(doc("PENDING")));
}

#[tokio::test]
async fn test_expired_key_reads_as_absent() {
    let store = MemoryStore::new();

    store
        .set_raw_ex("k", "v", Duration::from_millis(30))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(store.get_raw("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_nx_rejects_live_key_then_allows_after_expiry() {
    let store = MemoryStore::new();

    assert!(
        store
            .set_raw_nx_ex("k", "first", Duration::from_millis(40))
            .await
            .unwrap()
    );
    assert!(
        !store
            .set_raw_nx_ex("k", "second", Duration::from_secs(60))
            .await
            .unwrap()
    );

    tokio::time::sleep(Duration::from_millis(70)).await;

    assert!(
        store
            .set_raw_nx_ex("k", "third", Duration::from_secs(60))
            .await
            .unwrap()
    );
    assert_eq!(store.get_raw("k").await.unwrap().as_deref(), Some("third"));
}

#[tokio::test]
async fn test_swap_json_field_outcomes() {
    let store = MemoryStore::new();

    assert_eq!(
        store
            .swap_json_field("k", "status", "PENDING", "{}")
            .await
            .unwrap(),
        SwapOutcome::Missing
    );

    store
        .set_json_ex("k", &doc("PENDING"), Duration::from_secs(60))
        .await
        .unwrap();

    let next = serde_json::to_string(&doc("ACCEPTED")).unwrap();
    assert_eq!(
        store
            .swap_json_field("k", "status", "PENDING", &next)
            .await
            .unwrap(),
        SwapOutcome::Swapped
    );

    // Second resolver loses: the guarded field no longer matches.
    assert_eq!(
        store
            .swap_json_field("k", "status", "PENDING", &next)
            .await
            .unwrap(),
        SwapOutcome::Mismatch
    );

    let loaded: Option<Doc> = store.get_json("k").await.unwrap();
    assert_eq!(loaded.unwrap().status, "ACCEPTED");
}

#[tokio::test]
async fn test_hash_incr_by_float_accumulates() {
    let store = MemoryStore::new();

    let first = store.hash_incr_by_float("h", "value", 3.14).await.unwrap();
    let second = store.hash_incr_by_float("h", "value", 3.14).await.unwrap();

    assert!((first - 3.14).abs() < 1e-9);
    assert!((second - 6.28).abs() < 1e-9);
}

#[tokio::test]
async fn test_incr_many_applies_every_op() {
    let store = MemoryStore::new();

    let counts = store
        .incr_many(vec![
            CounterOp::Incr {
                key: "total".to_string(),
                by: 1,
            },
            CounterOp::HashIncr {
                key: "daily".to_string(),
                field: "2026-08-05".to_string(),
                by: 1,
            },
        ])
        .await
        .unwrap();

    assert_eq!(counts, vec![1, 1]);

    let daily = store.hash_get_all("daily").await.unwrap();
    assert_eq!(daily.get("2026-08-05").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_publish_reaches_every_subscriber() {
    let store = MemoryStore::new();

    let rx_a = store.subscribe("industry:tech").await.unwrap();
    let rx_b = store.subscribe("industry:tech").await.unwrap();
    let rx_other = store.subscribe("industry:law").await.unwrap();

    store.publish("industry:tech", "hello").await.unwrap();

    assert_eq!(rx_a.recv_async().await.unwrap(), "hello");
    assert_eq!(rx_b.recv_async().await.unwrap(), "hello");
    assert!(rx_other.try_recv().is_err());
}

#[tokio::test]
async fn test_publish_prunes_dropped_subscribers() {
    let store = MemoryStore::new();

    let rx = store.subscribe("industry:tech").await.unwrap();
    drop(rx);

    // Must not error once the receiver is gone.
    store.publish("industry:tech", "hello").await.unwrap();

    let rx = store.subscribe("industry:tech").await.unwrap();
    store.publish("industry:tech", "again").await.unwrap();
    assert_eq!(rx.recv_async().await.unwrap(), "again");
}
