use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use network_cache_keys::{InviteClicksKey, InviteDailyClicksKey};
use network_errors::{NetworkError, NetworkResult};
use network_models::InviteAnalytics;
use redis_connection::{CounterOp, KeyValueStore};
use tracing::{debug, instrument};

const DAY_BUCKET_FORMAT: &str = "%Y-%m-%d";

/// Click tracking for invite links: a total counter plus per-day buckets,
/// both monotonically increasing. Reads go straight to the store; the
/// counters are cheap and must reflect the latest click.
pub struct InviteClickCounter<S> {
    store: Arc<S>,
}

impl<S> InviteClickCounter<S>
where
    S: KeyValueStore,
{
    pub fn new(store: Arc<S>) -> Self { Self { store } }

    #[instrument(skip(self))]
    pub async fn record_click(&self, code: &str) -> NetworkResult<()> {
        self.record_click_on(code, Utc::now().date_naive()).await
    }

    /// Count one click against an explicit day. The total and the day
    /// bucket move in one atomic batch, so readers never observe one
    /// without the other.
    pub async fn record_click_on(
        &self, code: &str, day: NaiveDate,
    ) -> NetworkResult<()> {
        ensure_code(code)?;

        let bucket = day.format(DAY_BUCKET_FORMAT).to_string();
        self.store
            .incr_many(vec![
                CounterOp::Incr {
                    key: InviteClicksKey::of((code,)),
                    by: 1,
                },
                CounterOp::HashIncr {
                    key: InviteDailyClicksKey::of((code,)),
                    field: bucket,
                    by: 1,
                },
            ])
            .await?;

        debug!(invite.code = code, "click recorded");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn read_analytics(
        &self, code: &str,
    ) -> NetworkResult<InviteAnalytics> {
        ensure_code(code)?;

        let total_clicks = self
            .store
            .get_raw(&InviteClicksKey::of((code,)))
            .await?
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(0);

        let daily_clicks = self
            .store
            .hash_get_all(&InviteDailyClicksKey::of((code,)))
            .await?
            .into_iter()
            .filter_map(|(day, count)| {
                count.parse::<i64>().ok().map(|count| (day, count))
            })
            .collect();

        Ok(InviteAnalytics {
            total_clicks,
            daily_clicks,
        })
    }
}

fn ensure_code(code: &str) -> NetworkResult<()> {
    if code.trim().is_empty() {
        return Err(NetworkError::validation("empty invite code"));
    }
    Ok(())
}
