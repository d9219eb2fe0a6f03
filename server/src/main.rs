use std::{collections::HashMap, sync::Arc};

use directory_traits::{InMemoryDirectory, ProfileRecord};
use network_sessions::NetworkServices;
use redis_connection::{RedisStore, config::RedisDbConfig};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Profile seed file entry. Until the document-store client attaches,
/// the directory answers from this seed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedProfile {
    #[serde(default)]
    connection_count: i64,
    #[serde(default)]
    industries: Vec<String>,
}

fn load_directory() -> anyhow::Result<InMemoryDirectory> {
    let Ok(path) = std::env::var("PROFILE_SEED_PATH") else {
        return Ok(InMemoryDirectory::default());
    };
    let raw = std::fs::read_to_string(&path)?;
    let seed: HashMap<String, SeedProfile> = serde_json::from_str(&raw)?;
    let profiles = seed
        .into_iter()
        .map(|(user_id, profile)| {
            (user_id, ProfileRecord {
                connection_count: profile.connection_count,
                industries: profile.industries,
            })
        })
        .collect();
    info!(seed.path = %path, "profile directory seeded");
    Ok(InMemoryDirectory::new(profiles))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing store connection...");

    let redis_config = RedisDbConfig {
        host: std::env::var("REDIS_HOST")
            .unwrap_or_else(|_| "127.0.0.1".to_string()),
        port: std::env::var("REDIS_PORT")
            .unwrap_or_else(|_| "6379".to_string())
            .parse()
            .unwrap_or(6379),
        db: 0,
        command_timeout_ms: std::env::var("REDIS_COMMAND_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(2000),
    };
    let store = Arc::new(RedisStore::connect(&redis_config).await?);
    info!("Store connection pool initialized");

    let directory = Arc::new(load_directory()?);
    let services = Arc::new(NetworkServices::new(store, directory));
    info!(
        "Network services initialized; transport layer may attach sessions"
    );

    // The transport/auth layer owns sessions; this process runs the
    // subsystem until asked to stop. Dropping the services closes the
    // store client and every subscription with it.
    tokio::signal::ctrl_c().await?;
    info!("Shutting down network services");
    drop(services);

    Ok(())
}
