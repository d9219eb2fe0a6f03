pub mod industries;

use std::sync::Arc;

use cache_strategy::CacheManager;
use directory_traits::ProfileDirectory;
use network_broadcast::EventBroadcaster;
use network_connections::ConnectionStateMachine;
use network_errors::NetworkResult;
use network_invites::InviteClickCounter;
use network_ledger::NetworkValueLedger;
use network_models::{
    BASE_CONNECTION_VALUE, ConnectionRequest, GraphDelta, LinkKind,
};
use redis_connection::KeyValueStore;
use tracing::{instrument, warn};

pub use crate::industries::IndustryReader;

/// Creates the pending request and shows the optimistic pending edge to
/// every industry the pair shares.
pub struct RequestConnectionHandler<S, D> {
    connections: ConnectionStateMachine<S>,
    broadcaster: EventBroadcaster<S>,
    industries: IndustryReader<S, D>,
}

impl<S, D> RequestConnectionHandler<S, D>
where
    S: KeyValueStore + 'static,
    D: ProfileDirectory + 'static,
{
    pub fn new(
        store: Arc<S>, cache: Arc<CacheManager<S>>, directory: Arc<D>,
    ) -> Self {
        Self {
            connections: ConnectionStateMachine::new(store.clone()),
            broadcaster: EventBroadcaster::new(store),
            industries: IndustryReader::new(cache, directory),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, requester_id: &str, target_user_id: &str,
    ) -> NetworkResult<ConnectionRequest> {
        let request = self
            .connections
            .request(requester_id, target_user_id)
            .await?;

        // The mutation is committed; fan-out is best effort from here.
        let industries = shared_or_none(
            &self.industries,
            &request.requester_id,
            &request.target_id,
        )
        .await;
        if !industries.is_empty() {
            let delta = GraphDelta::linked(
                &request.requester_id,
                &request.target_id,
                LinkKind::Pending,
                industries,
            );
            self.broadcaster.broadcast_graph_delta(&delta).await;
        }

        Ok(request)
    }
}

/// Accepts the request, credits both sides, and announces the new edge.
pub struct AcceptConnectionHandler<S, D> {
    connections: ConnectionStateMachine<S>,
    ledger: NetworkValueLedger<S>,
    broadcaster: EventBroadcaster<S>,
    industries: IndustryReader<S, D>,
}

impl<S, D> AcceptConnectionHandler<S, D>
where
    S: KeyValueStore + 'static,
    D: ProfileDirectory + 'static,
{
    pub fn new(
        store: Arc<S>, cache: Arc<CacheManager<S>>, directory: Arc<D>,
    ) -> Self {
        Self {
            connections: ConnectionStateMachine::new(store.clone()),
            ledger: NetworkValueLedger::new(store.clone()),
            broadcaster: EventBroadcaster::new(store),
            industries: IndustryReader::new(cache, directory),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, connection_id: &str, acting_user_id: &str,
    ) -> NetworkResult<ConnectionRequest> {
        let accepted = self
            .connections
            .accept(connection_id, acting_user_id)
            .await?;

        // The winning transition credits each participant exactly once;
        // a racing accept never reaches this point twice.
        for user_id in [&accepted.requester_id, &accepted.target_id] {
            match self
                .ledger
                .increment(user_id, BASE_CONNECTION_VALUE)
                .await
            {
                Ok(change) => {
                    self.broadcaster
                        .broadcast_value_change(user_id, change)
                        .await;
                }
                Err(e) => {
                    // Reconciliation against the document store catches
                    // this up later; the accept itself stands.
                    warn!(
                        ledger.user = %user_id,
                        "value increment failed after accept: {e}"
                    );
                }
            }
        }

        let industries = shared_or_none(
            &self.industries,
            &accepted.requester_id,
            &accepted.target_id,
        )
        .await;
        if !industries.is_empty() {
            let delta = GraphDelta::linked(
                &accepted.requester_id,
                &accepted.target_id,
                LinkKind::Accepted,
                industries,
            );
            self.broadcaster.broadcast_graph_delta(&delta).await;
        }

        Ok(accepted)
    }
}

/// Rejects the request and retracts the pending edge from live views.
/// No value changes hands.
pub struct RejectConnectionHandler<S, D> {
    connections: ConnectionStateMachine<S>,
    broadcaster: EventBroadcaster<S>,
    industries: IndustryReader<S, D>,
}

impl<S, D> RejectConnectionHandler<S, D>
where
    S: KeyValueStore + 'static,
    D: ProfileDirectory + 'static,
{
    pub fn new(
        store: Arc<S>, cache: Arc<CacheManager<S>>, directory: Arc<D>,
    ) -> Self {
        Self {
            connections: ConnectionStateMachine::new(store.clone()),
            broadcaster: EventBroadcaster::new(store),
            industries: IndustryReader::new(cache, directory),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, connection_id: &str, acting_user_id: &str,
    ) -> NetworkResult<ConnectionRequest> {
        let rejected = self
            .connections
            .reject(connection_id, acting_user_id)
            .await?;

        let industries = shared_or_none(
            &self.industries,
            &rejected.requester_id,
            &rejected.target_id,
        )
        .await;
        if !industries.is_empty() {
            let delta = GraphDelta::unlinked(
                &rejected.requester_id,
                &rejected.target_id,
                industries,
            );
            self.broadcaster.broadcast_graph_delta(&delta).await;
        }

        Ok(rejected)
    }
}

/// Counts a click against an invite code.
pub struct RecordInviteClickHandler<S> {
    invites: InviteClickCounter<S>,
}

impl<S> RecordInviteClickHandler<S>
where
    S: KeyValueStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            invites: InviteClickCounter::new(store),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, code: &str) -> NetworkResult<()> {
        self.invites.record_click(code).await
    }
}

/// Industries shared by the pair, or nothing when the lookup fails;
/// broadcast is best effort once the state change committed.
async fn shared_or_none<S, D>(
    industries: &IndustryReader<S, D>, a: &str, b: &str,
) -> Vec<String>
where
    S: KeyValueStore + 'static,
    D: ProfileDirectory + 'static,
{
    match industries.shared_industries(a, b).await {
        Ok(shared) => shared,
        Err(e) => {
            warn!("industry lookup failed, skipping graph broadcast: {e}");
            Vec::new()
        }
    }
}
