use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use redis_connection::{JsonStoreExt, KeyValueStore};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{entry::CacheEntry, policy::KeyType};

/// Read-side cache with per-key-type freshness policy.
///
/// The cache is a performance layer, never a correctness dependency: a
/// store failure on the read path falls through to the loader, and a
/// store failure on the write path is logged and swallowed. Only a loader
/// failure on a synchronous miss reaches the caller.
pub struct CacheManager<S> {
    store: Arc<S>,
    /// Keys with a background revalidation in flight, so a burst of stale
    /// reads triggers exactly one refresh.
    refreshing: Arc<Mutex<HashSet<String>>>,
}

impl<S> CacheManager<S>
where
    S: KeyValueStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            refreshing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Wrap `data` in a freshly stamped entry for its key type.
    pub fn apply<T>(&self, key_type: KeyType, data: T) -> CacheEntry<T> {
        CacheEntry::stamp(key_type, data, Utc::now())
    }

    /// Policy-governed read. Fresh hit returns immediately; a stale but
    /// valid hit returns immediately and refreshes in the background; a
    /// miss or invalid entry loads synchronously and fills the cache.
    pub async fn read<T, E, F, Fut>(
        &self, key: &str, key_type: KeyType, loader: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        E: std::fmt::Display + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let now = Utc::now();
        match self.store.get_json::<CacheEntry<T>>(key).await {
            Ok(Some(entry)) if entry.is_valid(now) => {
                if entry.needs_revalidation(key_type, now) {
                    debug!(cache.key = key, "stale hit, revalidating");
                    self.spawn_revalidation(key, key_type, loader);
                }
                else {
                    debug!(cache.key = key, "cache hit");
                }
                return Ok(entry.data);
            }
            Ok(_) => {
                debug!(cache.key = key, "cache miss");
            }
            Err(e) => {
                // Cache-through-failure: the loader is the source of
                // truth when the store is unreachable.
                warn!(cache.key = key, "cache read failed: {e}");
                return loader().await;
            }
        }

        let data = loader().await?;
        Self::write_entry(&self.store, key, key_type, &data).await;
        Ok(data)
    }

    fn spawn_revalidation<T, E, F, Fut>(
        &self, key: &str, key_type: KeyType, loader: F,
    ) where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        E: std::fmt::Display + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        {
            let mut refreshing = self.refreshing.lock().unwrap();
            if !refreshing.insert(key.to_string()) {
                return;
            }
        }

        let store = self.store.clone();
        let refreshing = self.refreshing.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            match loader().await {
                Ok(data) => {
                    Self::write_entry(&store, &key, key_type, &data).await;
                }
                Err(e) => {
                    warn!(cache.key = %key, "revalidation load failed: {e}");
                }
            }
            refreshing.lock().unwrap().remove(&key);
        });
    }

    /// Fill the cache, best effort. Oversized payloads and store failures
    /// both leave the previous entry to age out on its own.
    async fn write_entry<T>(
        store: &S, key: &str, key_type: KeyType, data: &T,
    ) where
        T: Serialize,
    {
        let entry = CacheEntry::stamp(key_type, data, Utc::now());
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(cache.key = key, "cache entry not serializable: {e}");
                return;
            }
        };
        if let Some(max) = key_type.policy().max_payload_bytes {
            if raw.len() > max {
                debug!(
                    cache.key = key,
                    payload = raw.len(),
                    "payload over policy limit, not caching"
                );
                return;
            }
        }
        if let Err(e) = store
            .set_raw_ex(key, &raw, key_type.policy().ttl())
            .await
        {
            warn!(cache.key = key, "cache write failed: {e}");
        }
    }
}
