use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "PENDING",
            ConnectionStatus::Accepted => "ACCEPTED",
            ConnectionStatus::Rejected => "REJECTED",
        }
    }

    /// Accepted and rejected are terminal; nothing transitions out.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConnectionStatus::Pending)
    }
}

/// One connection request between two members, stored as an ephemeral
/// document under `connection:<id>` with a bounded lifetime. A record
/// absent from the store means "never requested", not an implicit state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub id: String,
    pub requester_id: String,
    pub target_id: String,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ConnectionRequest {
    /// Id for the unordered participant pair: invariant under swapping
    /// the two sides, so a request in either direction collides with an
    /// existing one.
    pub fn symmetric_id(a: &str, b: &str) -> String {
        if a <= b { format!("{a}:{b}") } else { format!("{b}:{a}") }
    }

    pub fn pending(requester_id: &str, target_id: &str) -> Self {
        Self {
            id: Self::symmetric_id(requester_id, target_id),
            requester_id: requester_id.to_string(),
            target_id: target_id.to_string(),
            status: ConnectionStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.target_id == user_id
    }

    /// Stamp a terminal status, keeping everything else.
    pub fn resolved(&self, status: ConnectionStatus) -> Self {
        Self {
            status,
            resolved_at: Some(Utc::now()),
            ..self.clone()
        }
    }
}
