use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::{CounterOp, KeyValueStore, StoreResult, SwapOutcome};

#[derive(Debug, Clone)]
enum MemoryValue {
    Raw(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: MemoryValue,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

#[derive(Default)]
struct MemoryInner {
    entries: HashMap<String, MemoryEntry>,
    channels: HashMap<String, Vec<flume::Sender<String>>>,
}

impl MemoryInner {
    /// Lazy expiry, matching Redis visibility: an expired key reads as
    /// absent and is reclaimed on access.
    fn live_entry(&mut self, key: &str) -> Option<&mut MemoryEntry> {
        if self.entries.get(key).is_some_and(MemoryEntry::expired) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn live_hash(&mut self, key: &str) -> &mut HashMap<String, String> {
        if self.live_entry(key).is_none() {
            self.entries.insert(key.to_string(), MemoryEntry {
                value: MemoryValue::Hash(HashMap::new()),
                expires_at: None,
            });
        }
        match &mut self.entries.get_mut(key).unwrap().value {
            MemoryValue::Hash(hash) => hash,
            value => {
                *value = MemoryValue::Hash(HashMap::new());
                match value {
                    MemoryValue::Hash(hash) => hash,
                    MemoryValue::Raw(_) => unreachable!(),
                }
            }
        }
    }
}

/// In-process [`KeyValueStore`] with Redis-equivalent semantics for the
/// operations this subsystem uses. Backs tests and local development; all
/// mutation happens under one lock, so batches and swaps are atomic by
/// construction.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.live_entry(key).and_then(|entry| {
            match &entry.value {
                MemoryValue::Raw(raw) => Some(raw.clone()),
                MemoryValue::Hash(_) => None,
            }
        }))
    }

    async fn set_raw_ex(
        &self, key: &str, value: &str, ttl: Duration,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.entries.insert(key.to_string(), MemoryEntry {
            value: MemoryValue::Raw(value.to_string()),
            expires_at: Some(Instant::now() + ttl),
        });
        Ok(())
    }

    async fn set_raw_nx_ex(
        &self, key: &str, value: &str, ttl: Duration,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        if inner.live_entry(key).is_some() {
            return Ok(false);
        }
        inner.entries.insert(key.to_string(), MemoryEntry {
            value: MemoryValue::Raw(value.to_string()),
            expires_at: Some(Instant::now() + ttl),
        });
        Ok(true)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        let existed = inner.live_entry(key).is_some();
        inner.entries.remove(key);
        Ok(existed)
    }

    async fn swap_json_field(
        &self, key: &str, field: &str, expected: &str, next: &str,
    ) -> StoreResult<SwapOutcome> {
        let mut inner = self.inner.lock().await;
        let Some(entry) = inner.live_entry(key) else {
            return Ok(SwapOutcome::Missing);
        };
        let MemoryValue::Raw(raw) = &entry.value else {
            return Ok(SwapOutcome::Mismatch);
        };
        let doc: serde_json::Value = serde_json::from_str(raw)?;
        let current = doc.get(field).and_then(serde_json::Value::as_str);
        if current != Some(expected) {
            return Ok(SwapOutcome::Mismatch);
        }
        // expires_at untouched: the swapped document keeps the original
        // deadline, as SET ... KEEPTTL does.
        entry.value = MemoryValue::Raw(next.to_string());
        Ok(SwapOutcome::Swapped)
    }

    async fn hash_incr_by_float(
        &self, key: &str, field: &str, delta: f64,
    ) -> StoreResult<f64> {
        let mut inner = self.inner.lock().await;
        let hash = inner.live_hash(key);
        let current = hash
            .get(field)
            .and_then(|raw| raw.parse::<f64>().ok())
            .unwrap_or(0.0);
        let next = current + delta;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn hash_set(
        &self, key: &str, field: &str, value: &str,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .live_hash(key)
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_get_all(
        &self, key: &str,
    ) -> StoreResult<HashMap<String, String>> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .live_entry(key)
            .and_then(|entry| {
                match &entry.value {
                    MemoryValue::Hash(hash) => Some(hash.clone()),
                    MemoryValue::Raw(_) => None,
                }
            })
            .unwrap_or_default())
    }

    async fn incr_many(&self, ops: Vec<CounterOp>) -> StoreResult<Vec<i64>> {
        let mut inner = self.inner.lock().await;
        let mut results = Vec::with_capacity(ops.len());
        for op in &ops {
            let (key, field, by) = match op {
                CounterOp::Incr { key, by } => (key.as_str(), None, *by),
                CounterOp::HashIncr { key, field, by } => {
                    (key.as_str(), Some(field.as_str()), *by)
                }
            };
            let next = match field {
                Some(field) => {
                    let hash = inner.live_hash(key);
                    let next = hash
                        .get(field)
                        .and_then(|raw| raw.parse::<i64>().ok())
                        .unwrap_or(0)
                        + by;
                    hash.insert(field.to_string(), next.to_string());
                    next
                }
                None => {
                    let current = inner
                        .live_entry(key)
                        .and_then(|entry| {
                            match &entry.value {
                                MemoryValue::Raw(raw) => {
                                    raw.parse::<i64>().ok()
                                }
                                MemoryValue::Hash(_) => None,
                            }
                        })
                        .unwrap_or(0);
                    let next = current + by;
                    inner.entries.insert(key.to_string(), MemoryEntry {
                        value: MemoryValue::Raw(next.to_string()),
                        expires_at: None,
                    });
                    next
                }
            };
            results.push(next);
        }
        Ok(results)
    }

    async fn publish(&self, channel: &str, payload: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(subscribers) = inner.channels.get_mut(channel) {
            // Prune subscribers whose receivers have gone away.
            subscribers
                .retain(|tx| tx.send(payload.to_string()).is_ok());
        }
        Ok(())
    }

    async fn subscribe(
        &self, channel: &str,
    ) -> StoreResult<flume::Receiver<String>> {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = flume::unbounded();
        inner
            .channels
            .entry(channel.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }
}
