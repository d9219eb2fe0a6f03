use std::sync::Arc;

use directory_traits::ProfileDirectory;
use network_broadcast::{industry_channel, user_channel};
use network_errors::NetworkError;
use network_models::{BroadcastEvent, InboundEvent, OutboundEvent};
use redis_connection::{KeyValueStore, StoreError};
use tracing::{instrument, warn};

use crate::services::NetworkServices;

/// Who this session is, as established by the transport/auth layer
/// before any event reaches the subsystem.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user_id: String,
    pub industries: Vec<String>,
}

/// Maps one session's inbound events onto the service layer. Successful
/// mutations answer through the pub/sub fan-out, not here; only queries
/// and failures produce a direct reply.
pub struct SessionHandler<S, D> {
    identity: SessionIdentity,
    services: Arc<NetworkServices<S, D>>,
}

impl<S, D> SessionHandler<S, D>
where
    S: KeyValueStore + 'static,
    D: ProfileDirectory + 'static,
{
    pub fn new(
        identity: SessionIdentity, services: Arc<NetworkServices<S, D>>,
    ) -> Self {
        Self { identity, services }
    }

    pub fn identity(&self) -> &SessionIdentity { &self.identity }

    #[instrument(skip(self, event), fields(session.user = %self.identity.user_id))]
    pub async fn dispatch(&self, event: InboundEvent) -> Option<OutboundEvent> {
        let op = operation_name(&event);
        let result = self.run(event).await;
        match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session.op = op, "session operation failed: {e}");
                let event = e.to_event();
                Some(OutboundEvent::Error {
                    code: event.code,
                    message: event.message,
                })
            }
        }
    }

    async fn run(
        &self, event: InboundEvent,
    ) -> Result<Option<OutboundEvent>, NetworkError> {
        let user_id = &self.identity.user_id;
        match event {
            InboundEvent::ConnectionRequest { target_user_id } => {
                self.services
                    .request_connection
                    .execute(user_id, &target_user_id)
                    .await?;
                Ok(None)
            }
            InboundEvent::ConnectionAccept { connection_id } => {
                self.services
                    .accept_connection
                    .execute(&connection_id, user_id)
                    .await?;
                Ok(None)
            }
            InboundEvent::ConnectionReject { connection_id } => {
                self.services
                    .reject_connection
                    .execute(&connection_id, user_id)
                    .await?;
                Ok(None)
            }
            InboundEvent::InviteClick { code } => {
                self.services.record_invite_click.execute(&code).await?;
                Ok(None)
            }
            InboundEvent::InviteAnalyticsRequest { code } => {
                let analytics =
                    self.services.invite_analytics.execute(&code).await?;
                Ok(Some(OutboundEvent::InviteAnalytics {
                    code,
                    click_count: analytics.total_clicks,
                    daily_click_data: analytics.daily_clicks,
                }))
            }
        }
    }
}

fn operation_name(event: &InboundEvent) -> &'static str {
    match event {
        InboundEvent::ConnectionRequest { .. } => "connectionRequest",
        InboundEvent::ConnectionAccept { .. } => "connectionAccept",
        InboundEvent::ConnectionReject { .. } => "connectionReject",
        InboundEvent::InviteClick { .. } => "inviteClick",
        InboundEvent::InviteAnalyticsRequest { .. } => {
            "inviteAnalyticsRequest"
        }
    }
}

/// Live fan-in for one session: one store subscription per declared
/// industry plus the session user's own value channel, all pumped into a
/// single outbound queue. Dropping this aborts the pumps and releases the
/// subscriptions.
pub struct SessionSubscriptions {
    events: flume::Receiver<OutboundEvent>,
    pumps: Vec<tokio::task::JoinHandle<()>>,
}

impl SessionSubscriptions {
    pub async fn attach<S>(
        store: &Arc<S>, identity: &SessionIdentity,
    ) -> Result<Self, StoreError>
    where
        S: KeyValueStore,
    {
        let (tx, rx) = flume::unbounded();

        let mut channels: Vec<String> = identity
            .industries
            .iter()
            .map(|industry| industry_channel(industry))
            .collect();
        channels.push(user_channel(&identity.user_id));

        let mut pumps = Vec::with_capacity(channels.len());
        for channel in channels {
            let source = store.subscribe(&channel).await?;
            let tx = tx.clone();
            pumps.push(tokio::spawn(async move {
                while let Ok(raw) = source.recv_async().await {
                    let event = match serde_json::from_str::<BroadcastEvent>(
                        &raw,
                    ) {
                        Ok(event) => event,
                        Err(e) => {
                            warn!(
                                session.channel = %channel,
                                "dropping undecodable broadcast: {e}"
                            );
                            continue;
                        }
                    };
                    if tx.send(event.into()).is_err() {
                        break;
                    }
                }
            }));
        }

        Ok(Self { events: rx, pumps })
    }

    pub fn events(&self) -> &flume::Receiver<OutboundEvent> { &self.events }
}

impl Drop for SessionSubscriptions {
    fn drop(&mut self) {
        for pump in &self.pumps {
            pump.abort();
        }
    }
}
