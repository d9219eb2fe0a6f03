use serde::{Deserialize, Serialize};

use crate::delta::GraphDelta;

/// Client actions arriving from the transport layer, which has already
/// authenticated the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundEvent {
    #[serde(rename_all = "camelCase")]
    ConnectionRequest { target_user_id: String },
    #[serde(rename_all = "camelCase")]
    ConnectionAccept { connection_id: String },
    #[serde(rename_all = "camelCase")]
    ConnectionReject { connection_id: String },
    #[serde(rename_all = "camelCase")]
    InviteClick { code: String },
    #[serde(rename_all = "camelCase")]
    InviteAnalyticsRequest { code: String },
}

/// Events handed back to the transport layer for delivery to one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundEvent {
    NetworkUpdate(GraphDelta),
    #[serde(rename_all = "camelCase")]
    NetworkValueChange {
        user_id: String,
        new_value: f64,
        change: f64,
    },
    #[serde(rename_all = "camelCase")]
    InviteAnalytics {
        code: String,
        click_count: i64,
        daily_click_data: std::collections::BTreeMap<String, i64>,
    },
    #[serde(rename_all = "camelCase")]
    Error { code: String, message: String },
}

/// Envelope published on store pub/sub channels. Producers never know
/// which sessions are listening; subscribers turn these into
/// [`OutboundEvent`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BroadcastEvent {
    NetworkUpdate(GraphDelta),
    #[serde(rename_all = "camelCase")]
    NetworkValueChange {
        user_id: String,
        new_value: f64,
        change: f64,
    },
}

impl From<BroadcastEvent> for OutboundEvent {
    fn from(event: BroadcastEvent) -> Self {
        match event {
            BroadcastEvent::NetworkUpdate(delta) => {
                OutboundEvent::NetworkUpdate(delta)
            }
            BroadcastEvent::NetworkValueChange {
                user_id,
                new_value,
                change,
            } => {
                OutboundEvent::NetworkValueChange {
                    user_id,
                    new_value,
                    change,
                }
            }
        }
    }
}
