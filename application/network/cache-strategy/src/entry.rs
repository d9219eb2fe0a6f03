use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::KeyType;

/// A cached value wrapped with its freshness metadata. Written on every
/// cache fill; once past `expires_at` it is discarded, never rewritten in
/// place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    pub last_updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Stamp `data` with the freshness window of its key type, anchored
    /// at `now`. Keeps `expires_at > last_updated_at` by construction.
    pub fn stamp(key_type: KeyType, data: T, now: DateTime<Utc>) -> Self {
        let policy = key_type.policy();
        Self {
            data,
            last_updated_at: now,
            expires_at: now + Duration::seconds(policy.ttl_secs as i64),
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Valid but older than the stale window: serve it, refresh it in the
    /// background.
    pub fn needs_revalidation(
        &self, key_type: KeyType, now: DateTime<Utc>,
    ) -> bool {
        let window = Duration::seconds(
            key_type.policy().stale_window_secs as i64,
        );
        now - self.last_updated_at > window
    }
}
