use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use deadpool_redis::{Pool, redis::AsyncCommands};
use futures::StreamExt;
use redis::Script;
use tracing::warn;

use crate::store::{
    CounterOp, KeyValueStore, StoreError, StoreResult, SwapOutcome,
};

/// Conditional replace keyed on one top-level string field of a JSON
/// document. `SET ... KEEPTTL` preserves the remaining expiry so resolved
/// records still die at their original deadline.
const SWAP_JSON_FIELD: &str = r#"
local cur = redis.call('GET', KEYS[1])
if not cur then return -1 end
local doc = cjson.decode(cur)
if doc[ARGV[1]] ~= ARGV[2] then return 0 end
redis.call('SET', KEYS[1], ARGV[3], 'KEEPTTL')
return 1
"#;

/// Production [`KeyValueStore`] backed by a Redis connection pool.
///
/// Commands run under `command_timeout`; subscriptions use a dedicated
/// client connection per channel, pumped into a flume receiver.
pub struct RedisStore {
    pool: Pool,
    client: redis::Client,
    command_timeout: Duration,
    swap_script: Script,
}

impl RedisStore {
    pub fn new(
        pool: Pool, client: redis::Client, command_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            client,
            command_timeout,
            swap_script: Script::new(SWAP_JSON_FIELD),
        }
    }

    pub async fn connect(
        config: &crate::config::RedisDbConfig,
    ) -> anyhow::Result<Self> {
        let pool = crate::connect_redis_db(config).await?;
        let client = redis::Client::open(crate::redis_url(config).as_str())?;
        Ok(Self::new(pool, client, config.command_timeout()))
    }

    async fn bounded<T>(
        &self, op: &'static str,
        fut: impl Future<Output = StoreResult<T>> + Send,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(store.op = op, timeout = ?self.command_timeout, "store command timed out");
                Err(StoreError::Timeout(self.command_timeout))
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        self.bounded("get", async {
            let mut conn = self.pool.get().await?;
            Ok(conn.get(key).await?)
        })
        .await
    }

    async fn set_raw_ex(
        &self, key: &str, value: &str, ttl: Duration,
    ) -> StoreResult<()> {
        self.bounded("set_ex", async {
            let mut conn = self.pool.get().await?;
            let _: () = conn.set_ex(key, value, ttl.as_secs()).await?;
            Ok(())
        })
        .await
    }

    async fn set_raw_nx_ex(
        &self, key: &str, value: &str, ttl: Duration,
    ) -> StoreResult<bool> {
        self.bounded("set_nx_ex", async {
            let mut conn = self.pool.get().await?;
            let reply: Option<String> = deadpool_redis::redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("EX")
                .arg(ttl.as_secs())
                .query_async(&mut conn)
                .await?;
            Ok(reply.is_some())
        })
        .await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.bounded("del", async {
            let mut conn = self.pool.get().await?;
            let removed: u32 = conn.del(key).await?;
            Ok(removed > 0)
        })
        .await
    }

    async fn swap_json_field(
        &self, key: &str, field: &str, expected: &str, next: &str,
    ) -> StoreResult<SwapOutcome> {
        self.bounded("swap_json_field", async {
            let mut conn = self.pool.get().await?;
            let verdict: i64 = self
                .swap_script
                .key(key)
                .arg(field)
                .arg(expected)
                .arg(next)
                .invoke_async(&mut conn)
                .await?;
            Ok(match verdict {
                1 => SwapOutcome::Swapped,
                0 => SwapOutcome::Mismatch,
                _ => SwapOutcome::Missing,
            })
        })
        .await
    }

    async fn hash_incr_by_float(
        &self, key: &str, field: &str, delta: f64,
    ) -> StoreResult<f64> {
        self.bounded("hincrbyfloat", async {
            let mut conn = self.pool.get().await?;
            Ok(conn.hincr(key, field, delta).await?)
        })
        .await
    }

    async fn hash_set(
        &self, key: &str, field: &str, value: &str,
    ) -> StoreResult<()> {
        self.bounded("hset", async {
            let mut conn = self.pool.get().await?;
            let _: i64 = conn.hset(key, field, value).await?;
            Ok(())
        })
        .await
    }

    async fn hash_get_all(
        &self, key: &str,
    ) -> StoreResult<HashMap<String, String>> {
        self.bounded("hgetall", async {
            let mut conn = self.pool.get().await?;
            Ok(conn.hgetall(key).await?)
        })
        .await
    }

    async fn incr_many(&self, ops: Vec<CounterOp>) -> StoreResult<Vec<i64>> {
        self.bounded("incr_many", async {
            let mut conn = self.pool.get().await?;
            let mut pipe = deadpool_redis::redis::pipe();
            pipe.atomic();
            for op in &ops {
                match op {
                    CounterOp::Incr { key, by } => {
                        pipe.incr(key, *by);
                    }
                    CounterOp::HashIncr { key, field, by } => {
                        pipe.hincr(key, field, *by);
                    }
                }
            }
            Ok(pipe.query_async(&mut conn).await?)
        })
        .await
    }

    async fn publish(&self, channel: &str, payload: &str) -> StoreResult<()> {
        self.bounded("publish", async {
            let mut conn = self.pool.get().await?;
            let _: i64 = conn.publish(channel, payload).await?;
            Ok(())
        })
        .await
    }

    async fn subscribe(
        &self, channel: &str,
    ) -> StoreResult<flume::Receiver<String>> {
        let mut pubsub = self
            .bounded("subscribe", async {
                Ok(self.client.get_async_pubsub().await?)
            })
            .await?;
        pubsub.subscribe(channel).await?;

        let (tx, rx) = flume::unbounded();
        let channel = channel.to_string();
        tokio::spawn(async move {
            let mut messages = pubsub.on_message();
            while let Some(message) = messages.next().await {
                let payload: String = match message.get_payload() {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(store.channel = %channel, "dropping undecodable message: {e}");
                        continue;
                    }
                };
                if tx.send(payload).is_err() {
                    // Receiver dropped; tear down this subscription.
                    break;
                }
            }
        });

        Ok(rx)
    }
}
