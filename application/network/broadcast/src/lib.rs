use std::sync::Arc;

use network_models::{BroadcastEvent, GraphDelta, ValueChange};
use redis_connection::KeyValueStore;
use tracing::{instrument, warn};

/// Channel carrying graph deltas for everyone declaring `industry`.
pub fn industry_channel(industry: &str) -> String {
    format!("industry:{industry}")
}

/// Channel carrying value changes for one user's own sessions.
pub fn user_channel(user_id: &str) -> String { format!("user:{user_id}") }

/// Fan-out of committed changes over store pub/sub. Delivery is
/// at-most-once and best-effort: a publish that fails is logged and
/// dropped, and the broadcaster knows channel names, never sessions.
pub struct EventBroadcaster<S> {
    store: Arc<S>,
}

impl<S> EventBroadcaster<S>
where
    S: KeyValueStore,
{
    pub fn new(store: Arc<S>) -> Self { Self { store } }

    pub async fn publish(&self, channel: &str, event: &BroadcastEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(broadcast.channel = channel, "unencodable event: {e}");
                return;
            }
        };
        if let Err(e) = self.store.publish(channel, &payload).await {
            warn!(broadcast.channel = channel, "dropping broadcast: {e}");
        }
    }

    /// One publish per industry the delta touches.
    #[instrument(skip(self, delta))]
    pub async fn broadcast_graph_delta(&self, delta: &GraphDelta) {
        for industry in &delta.industries {
            self.publish(
                &industry_channel(industry),
                &BroadcastEvent::NetworkUpdate(delta.clone()),
            )
            .await;
        }
    }

    #[instrument(skip(self, change))]
    pub async fn broadcast_value_change(
        &self, user_id: &str, change: ValueChange,
    ) {
        self.publish(&user_channel(user_id), &BroadcastEvent::NetworkValueChange {
            user_id: user_id.to_string(),
            new_value: change.new_value,
            change: change.change(),
        })
        .await;
    }
}
