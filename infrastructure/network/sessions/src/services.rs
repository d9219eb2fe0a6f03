use std::sync::Arc;

use cache_strategy::CacheManager;
use directory_traits::ProfileDirectory;
use network_command_handlers::{
    AcceptConnectionHandler, RecordInviteClickHandler,
    RejectConnectionHandler, RequestConnectionHandler,
};
use network_query_handlers::InviteAnalyticsHandler;
use redis_connection::KeyValueStore;

/// Every component of the subsystem, constructed once at startup around
/// one store and one directory, then shared by reference. Nothing in
/// here is a global; tearing the bundle down drops the store client and
/// with it every subscription.
pub struct NetworkServices<S, D> {
    pub request_connection: RequestConnectionHandler<S, D>,
    pub accept_connection: AcceptConnectionHandler<S, D>,
    pub reject_connection: RejectConnectionHandler<S, D>,
    pub record_invite_click: RecordInviteClickHandler<S>,
    pub invite_analytics: InviteAnalyticsHandler<S>,
    store: Arc<S>,
}

impl<S, D> NetworkServices<S, D>
where
    S: KeyValueStore + 'static,
    D: ProfileDirectory + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>) -> Self {
        // One cache manager for every handler, so the in-flight
        // revalidation guard is shared.
        let cache = Arc::new(CacheManager::new(store.clone()));

        Self {
            request_connection: RequestConnectionHandler::new(
                store.clone(),
                cache.clone(),
                directory.clone(),
            ),
            accept_connection: AcceptConnectionHandler::new(
                store.clone(),
                cache.clone(),
                directory.clone(),
            ),
            reject_connection: RejectConnectionHandler::new(
                store.clone(),
                cache,
                directory,
            ),
            record_invite_click: RecordInviteClickHandler::new(
                store.clone(),
            ),
            invite_analytics: InviteAnalyticsHandler::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> { &self.store }
}
