use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use directory_traits::{InMemoryDirectory, ProfileRecord};
use redis_connection::{
    CounterOp, KeyValueStore, MemoryStore, StoreError, StoreResult,
    SwapOutcome,
};

/// Fresh in-memory store, the default backend for component tests.
pub fn memory_store() -> Arc<MemoryStore> { Arc::new(MemoryStore::new()) }

/// Directory seeded with industries only; connection counts default to 0.
pub fn seeded_directory(
    profiles: &[(&str, &[&str])],
) -> Arc<InMemoryDirectory> {
    let mut map = HashMap::new();
    for (user_id, industries) in profiles {
        map.insert(user_id.to_string(), ProfileRecord {
            connection_count: 0,
            industries: industries
                .iter()
                .map(|industry| industry.to_string())
                .collect(),
        });
    }
    Arc::new(InMemoryDirectory::new(map))
}

/// Store whose every operation times out, for exercising degraded paths.
pub struct FailingStore;

impl FailingStore {
    fn unavailable<T>() -> StoreResult<T> {
        Err(StoreError::Timeout(Duration::from_millis(10)))
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get_raw(&self, _key: &str) -> StoreResult<Option<String>> {
        Self::unavailable()
    }

    async fn set_raw_ex(
        &self, _key: &str, _value: &str, _ttl: Duration,
    ) -> StoreResult<()> {
        Self::unavailable()
    }

    async fn set_raw_nx_ex(
        &self, _key: &str, _value: &str, _ttl: Duration,
    ) -> StoreResult<bool> {
        Self::unavailable()
    }

    async fn delete(&self, _key: &str) -> StoreResult<bool> {
        Self::unavailable()
    }

    async fn swap_json_field(
        &self, _key: &str, _field: &str, _expected: &str, _next: &str,
    ) -> StoreResult<SwapOutcome> {
        Self::unavailable()
    }

    async fn hash_incr_by_float(
        &self, _key: &str, _field: &str, _delta: f64,
    ) -> StoreResult<f64> {
        Self::unavailable()
    }

    async fn hash_set(
        &self, _key: &str, _field: &str, _value: &str,
    ) -> StoreResult<()> {
        Self::unavailable()
    }

    async fn hash_get_all(
        &self, _key: &str,
    ) -> StoreResult<HashMap<String, String>> {
        Self::unavailable()
    }

    async fn incr_many(
        &self, _ops: Vec<CounterOp>,
    ) -> StoreResult<Vec<i64>> {
        Self::unavailable()
    }

    async fn publish(
        &self, _channel: &str, _payload: &str,
    ) -> StoreResult<()> {
        Self::unavailable()
    }

    async fn subscribe(
        &self, _channel: &str,
    ) -> StoreResult<flume::Receiver<String>> {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_store_always_times_out() {
        let result = FailingStore.get_raw("k").await;
        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }
}
