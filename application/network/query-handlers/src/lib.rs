use std::sync::Arc;

use network_errors::NetworkResult;
use network_invites::InviteClickCounter;
use network_models::InviteAnalytics;
use redis_connection::KeyValueStore;
use tracing::instrument;

/// Serves invite analytics straight from the counters. Deliberately
/// uncached: the numbers are one key and one hash away, and stale counts
/// read as broken to the invite's owner.
pub struct InviteAnalyticsHandler<S> {
    invites: InviteClickCounter<S>,
}

impl<S> InviteAnalyticsHandler<S>
where
    S: KeyValueStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            invites: InviteClickCounter::new(store),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, code: &str,
    ) -> NetworkResult<InviteAnalytics> {
        self.invites.read_analytics(code).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use network_invites::InviteClickCounter;
    use test_utils::memory_store;

    use super::*;

    #[tokio::test]
    async fn test_analytics_reflect_the_latest_click() {
        let store = memory_store();
        let counter = InviteClickCounter::new(store.clone());
        let handler = InviteAnalyticsHandler::new(store);

        let day =
            NaiveDate::parse_from_str("2026-08-05", "%Y-%m-%d").unwrap();
        counter.record_click_on("ABC123", day).await.unwrap();

        let analytics = handler.execute("ABC123").await.unwrap();
        assert_eq!(analytics.total_clicks, 1);

        // A second click is visible immediately, with no cache window.
        counter.record_click_on("ABC123", day).await.unwrap();
        let analytics = handler.execute("ABC123").await.unwrap();
        assert_eq!(analytics.total_clicks, 2);
    }
}
