use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use cache_strategy::{CacheEntry, CacheManager, KeyType};
use chrono::Utc;
use redis_connection::{JsonStoreExt, MemoryStore};
use test_utils::{FailingStore, memory_store};

fn counting_loader(
    counter: &Arc<AtomicUsize>, value: &str,
) -> impl FnOnce() -> std::pin::Pin<
    Box<dyn Future<Output = Result<String, std::convert::Infallible>> + Send>,
> + Send
+ 'static {
    let counter = counter.clone();
    let value = value.to_string();
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(value) })
    }
}

async fn wait_for_loads(counter: &Arc<AtomicUsize>, expected: usize) {
    for _ in 0..100 {
        if counter.load(Ordering::SeqCst) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected {expected} loader calls, saw {}",
        counter.load(Ordering::SeqCst)
    );
}

#[tokio::test]
async fn test_miss_loads_synchronously_and_fills_cache() {
    let store = memory_store();
    let manager = CacheManager::new(store.clone());
    let loads = Arc::new(AtomicUsize::new(0));

    let value = manager
        .read(
            "cache:user:u1",
            KeyType::User,
            counting_loader(&loads, "alice"),
        )
        .await
        .unwrap();

    assert_eq!(value, "alice");
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    // Second read is a fresh hit; the loader stays untouched.
    let value = manager
        .read(
            "cache:user:u1",
            KeyType::User,
            counting_loader(&loads, "other"),
        )
        .await
        .unwrap();

    assert_eq!(value, "alice");
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_loader_failure_on_miss_propagates() {
    let store = memory_store();
    let manager = CacheManager::new(store);

    let result: Result<String, &str> = manager
        .read("cache:user:u1", KeyType::User, || {
            async { Err("directory offline") }
        })
        .await;

    assert_eq!(result.unwrap_err(), "directory offline");
}

#[tokio::test]
async fn test_stale_entry_served_while_revalidating_once() {
    let store = memory_store();
    let manager = CacheManager::new(store.clone());
    let loads = Arc::new(AtomicUsize::new(0));

    // Plant an entry past its stale window but inside its ttl.
    let stale_secs =
        KeyType::User.policy().stale_window_secs as i64 + 10;
    let entry = CacheEntry {
        data: "old".to_string(),
        last_updated_at: Utc::now() - chrono::Duration::seconds(stale_secs),
        expires_at: Utc::now() + chrono::Duration::seconds(600),
    };
    store
        .set_json_ex("cache:user:u1", &entry, Duration::from_secs(600))
        .await
        .unwrap();

    let value = manager
        .read(
            "cache:user:u1",
            KeyType::User,
            counting_loader(&loads, "fresh"),
        )
        .await
        .unwrap();

    // The stale value is served immediately.
    assert_eq!(value, "old");

    // Exactly one background load fires, then the cache holds the new
    // value.
    wait_for_loads(&loads, 1).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let value = manager
        .read(
            "cache:user:u1",
            KeyType::User,
            counting_loader(&loads, "ignored"),
        )
        .await
        .unwrap();
    assert_eq!(value, "fresh");
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_entry_reloads_synchronously() {
    let store = memory_store();
    let manager = CacheManager::new(store.clone());
    let loads = Arc::new(AtomicUsize::new(0));

    let entry = CacheEntry {
        data: "dead".to_string(),
        last_updated_at: Utc::now() - chrono::Duration::seconds(7200),
        expires_at: Utc::now() - chrono::Duration::seconds(3600),
    };
    store
        .set_json_ex("cache:user:u1", &entry, Duration::from_secs(600))
        .await
        .unwrap();

    let value = manager
        .read(
            "cache:user:u1",
            KeyType::User,
            counting_loader(&loads, "fresh"),
        )
        .await
        .unwrap();

    assert_eq!(value, "fresh");
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_store_failure_falls_through_to_loader() {
    let manager = CacheManager::new(Arc::new(FailingStore));
    let loads = Arc::new(AtomicUsize::new(0));

    let value = manager
        .read(
            "cache:user:u1",
            KeyType::User,
            counting_loader(&loads, "alice"),
        )
        .await
        .unwrap();

    assert_eq!(value, "alice");
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oversized_payload_is_served_but_not_cached() {
    let store: Arc<MemoryStore> = memory_store();
    let manager = CacheManager::new(store.clone());
    let loads = Arc::new(AtomicUsize::new(0));

    let max = KeyType::IndustryList
        .policy()
        .max_payload_bytes
        .expect("industry lists carry a payload cap");
    let huge = "x".repeat(max + 1);

    let value = manager
        .read(
            "cache:industryList:u1",
            KeyType::IndustryList,
            counting_loader(&loads, &huge),
        )
        .await
        .unwrap();
    assert_eq!(value.len(), max + 1);

    // Nothing was cached, so the next read loads again.
    manager
        .read(
            "cache:industryList:u1",
            KeyType::IndustryList,
            counting_loader(&loads, &huge),
        )
        .await
        .unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_apply_stamps_a_valid_entry() {
    let manager = CacheManager::new(memory_store());

    let entry = manager.apply(KeyType::User, "alice".to_string());

    assert!(entry.is_valid(Utc::now()));
    assert!(entry.expires_at > entry.last_updated_at);
}
