use std::sync::Arc;

use chrono::{DateTime, Utc};
use network_cache_keys::NetworkValueKey;
use network_errors::NetworkResult;
use network_models::{BASE_CONNECTION_VALUE, NetworkValueRecord, ValueChange};
use redis_connection::KeyValueStore;
use tracing::{instrument, warn};

const VALUE_FIELD: &str = "value";
const LAST_CHANGE_FIELD: &str = "lastChangeAt";

/// Derived per-user network value. The live path is a single atomic
/// float increment on the store; nothing ever writes the value wholesale,
/// so concurrent increments for the same user cannot lose updates.
pub struct NetworkValueLedger<S> {
    store: Arc<S>,
}

impl<S> NetworkValueLedger<S>
where
    S: KeyValueStore,
{
    pub fn new(store: Arc<S>) -> Self { Self { store } }

    #[instrument(skip(self))]
    pub async fn increment(
        &self, user_id: &str, delta: f64,
    ) -> NetworkResult<ValueChange> {
        let key = NetworkValueKey::of((user_id,));
        let new_value = self
            .store
            .hash_incr_by_float(&key, VALUE_FIELD, delta)
            .await?;

        // The change timestamp is bookkeeping; the increment already
        // committed, so a failed stamp must not undo it.
        if let Err(e) = self
            .store
            .hash_set(&key, LAST_CHANGE_FIELD, &Utc::now().to_rfc3339())
            .await
        {
            warn!(ledger.user = user_id, "change stamp failed: {e}");
        }

        Ok(ValueChange {
            old_value: new_value - delta,
            new_value,
        })
    }

    /// Current record, if the user has ever accrued value.
    pub async fn record(
        &self, user_id: &str,
    ) -> NetworkResult<Option<NetworkValueRecord>> {
        let key = NetworkValueKey::of((user_id,));
        let fields = self.store.hash_get_all(&key).await?;
        let Some(value) =
            fields.get(VALUE_FIELD).and_then(|raw| raw.parse::<f64>().ok())
        else {
            return Ok(None);
        };
        let last_change_at = fields
            .get(LAST_CHANGE_FIELD)
            .and_then(|raw| raw.parse::<DateTime<Utc>>().ok())
            .unwrap_or_default();
        Ok(Some(NetworkValueRecord {
            user_id: user_id.to_string(),
            value,
            last_change_at,
        }))
    }
}

/// Expected value for a user with `n` accepted connections. Used for
/// reconciliation against the document store, never as the live path.
pub fn value_for_connection_count(n: i64) -> f64 {
    n as f64 * BASE_CONNECTION_VALUE
}
