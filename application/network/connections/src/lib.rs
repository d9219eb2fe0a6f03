use std::{sync::Arc, time::Duration};

use network_cache_keys::ConnectionKey;
use network_errors::{NetworkError, NetworkResult};
use network_models::{ConnectionRequest, ConnectionStatus};
use redis_connection::{
    JsonStoreExt, KeyValueStore, StoreError, SwapOutcome,
};
use tracing::{debug, instrument};

/// Every request dies 24h after creation, resolved or not. Terminal
/// transitions keep the remaining window rather than resetting it.
pub const CONNECTION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Pending/accepted/rejected lifecycle of a connection request, held as
/// an ephemeral store document. Transitions are conditioned on the status
/// at write time, so interleaved resolvers settle to exactly one winner.
pub struct ConnectionStateMachine<S> {
    store: Arc<S>,
}

impl<S> ConnectionStateMachine<S>
where
    S: KeyValueStore,
{
    pub fn new(store: Arc<S>) -> Self { Self { store } }

    #[instrument(skip(self))]
    pub async fn request(
        &self, requester_id: &str, target_id: &str,
    ) -> NetworkResult<ConnectionRequest> {
        ensure_user_id(requester_id)?;
        ensure_user_id(target_id)?;
        if requester_id == target_id {
            return Err(NetworkError::validation(
                "cannot request a connection with yourself",
            ));
        }

        let request = ConnectionRequest::pending(requester_id, target_id);
        let key = ConnectionKey::of((request.id.as_str(),));

        // One live request per unordered pair: the id is symmetric and
        // the write is create-if-absent, so a request from either side
        // collides with an existing record in any state.
        let created = self
            .store
            .set_json_nx_ex(&key, &request, CONNECTION_TTL)
            .await?;
        if !created {
            return Err(NetworkError::Conflict);
        }

        debug!(connection.id = %request.id, "connection requested");
        Ok(request)
    }

    #[instrument(skip(self))]
    pub async fn accept(
        &self, connection_id: &str, acting_user_id: &str,
    ) -> NetworkResult<ConnectionRequest> {
        self.resolve(connection_id, acting_user_id, ConnectionStatus::Accepted)
            .await
    }

    #[instrument(skip(self))]
    pub async fn reject(
        &self, connection_id: &str, acting_user_id: &str,
    ) -> NetworkResult<ConnectionRequest> {
        self.resolve(connection_id, acting_user_id, ConnectionStatus::Rejected)
            .await
    }

    async fn resolve(
        &self, connection_id: &str, acting_user_id: &str,
        status: ConnectionStatus,
    ) -> NetworkResult<ConnectionRequest> {
        if connection_id.trim().is_empty() {
            return Err(NetworkError::validation("empty connection id"));
        }
        ensure_user_id(acting_user_id)?;

        let key = ConnectionKey::of((connection_id,));
        let Some(current) =
            self.store.get_json::<ConnectionRequest>(&key).await?
        else {
            return Err(NetworkError::NotFound);
        };

        if current.status.is_terminal() {
            return Err(NetworkError::NotFound);
        }
        // A non-participant learns nothing about the record's existence.
        if !current.is_participant(acting_user_id) {
            return Err(NetworkError::NotFound);
        }
        if acting_user_id != current.target_id {
            return Err(NetworkError::Unauthorized);
        }

        let resolved = current.resolved(status);
        let next =
            serde_json::to_string(&resolved).map_err(StoreError::from)?;

        // Conditioned on the status still being PENDING at write time: a
        // concurrent resolver that lost the race sees Mismatch here, not
        // a double transition.
        match self
            .store
            .swap_json_field(
                &key,
                "status",
                ConnectionStatus::Pending.as_str(),
                &next,
            )
            .await?
        {
            SwapOutcome::Swapped => {
                debug!(
                    connection.id = connection_id,
                    connection.status = resolved.status.as_str(),
                    "connection resolved"
                );
                Ok(resolved)
            }
            SwapOutcome::Mismatch | SwapOutcome::Missing => {
                Err(NetworkError::NotFound)
            }
        }
    }
}

fn ensure_user_id(user_id: &str) -> NetworkResult<()> {
    if user_id.trim().is_empty() {
        return Err(NetworkError::validation("empty user id"));
    }
    Ok(())
}
