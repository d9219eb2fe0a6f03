use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),
    #[error("store command error: {0}")]
    Command(#[from] deadpool_redis::redis::RedisError),
    #[error("store command timed out after {0:?}")]
    Timeout(Duration),
    #[error("store payload codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Outcome of a conditional document replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Field matched, document replaced, TTL preserved.
    Swapped,
    /// Document exists but the guarded field held another value.
    Mismatch,
    /// No document under the key (never written or expired).
    Missing,
}

/// One increment in an atomic counter batch.
#[derive(Debug, Clone)]
pub enum CounterOp {
    Incr { key: String, by: i64 },
    HashIncr { key: String, field: String, by: i64 },
}

/// Async facade over the key-value store primitives this subsystem uses.
///
/// Implemented by [`crate::RedisStore`] against a live server and by
/// [`crate::MemoryStore`] for tests. All operations run under a bounded
/// timeout in the Redis implementation; a timeout surfaces as
/// [`StoreError::Timeout`] and is retryable by the caller.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set_raw_ex(
        &self, key: &str, value: &str, ttl: Duration,
    ) -> StoreResult<()>;

    /// Atomic create-if-absent with expiry. Returns false when the key
    /// already holds a live value.
    async fn set_raw_nx_ex(
        &self, key: &str, value: &str, ttl: Duration,
    ) -> StoreResult<bool>;

    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Replace the JSON document at `key` only if its top-level string
    /// `field` currently equals `expected`, keeping the remaining TTL.
    async fn swap_json_field(
        &self, key: &str, field: &str, expected: &str, next: &str,
    ) -> StoreResult<SwapOutcome>;

    /// Atomic float increment of a hash field; returns the new value.
    async fn hash_incr_by_float(
        &self, key: &str, field: &str, delta: f64,
    ) -> StoreResult<f64>;

    async fn hash_set(
        &self, key: &str, field: &str, value: &str,
    ) -> StoreResult<()>;

    async fn hash_get_all(
        &self, key: &str,
    ) -> StoreResult<HashMap<String, String>>;

    /// Apply a batch of integer increments as one atomic unit: either
    /// every op lands or none does. Returns the post-increment values in
    /// op order.
    async fn incr_many(&self, ops: Vec<CounterOp>) -> StoreResult<Vec<i64>>;

    async fn publish(&self, channel: &str, payload: &str) -> StoreResult<()>;

    /// Register a subscriber for `channel`; published payloads arrive on
    /// the returned receiver until it is dropped.
    async fn subscribe(
        &self, channel: &str,
    ) -> StoreResult<flume::Receiver<String>>;
}

/// JSON document helpers layered over the raw string operations.
#[async_trait]
pub trait JsonStoreExt: KeyValueStore {
    async fn get_json<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_json_ex<T>(
        &self, key: &str, value: &T, ttl: Duration,
    ) -> StoreResult<()>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)?;
        self.set_raw_ex(key, &raw, ttl).await
    }

    async fn set_json_nx_ex<T>(
        &self, key: &str, value: &T, ttl: Duration,
    ) -> StoreResult<bool>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)?;
        self.set_raw_nx_ex(key, &raw, ttl).await
    }
}

impl<S> JsonStoreExt for S where S: KeyValueStore {}
