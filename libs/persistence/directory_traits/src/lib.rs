use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("profile not found: {user_id}")]
    ProfileNotFound { user_id: String },
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the persistent document store. This subsystem never
/// writes through it; it is the loader of last resort when nothing usable
/// is in the key-value store.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn load_connection_count(
        &self, user_id: &str,
    ) -> Result<i64, DirectoryError>;

    async fn load_industries(
        &self, user_id: &str,
    ) -> Result<Vec<String>, DirectoryError>;
}

#[derive(Debug, Clone, Default)]
pub struct ProfileRecord {
    pub connection_count: i64,
    pub industries: Vec<String>,
}

/// Map-backed directory. Stands in for the document-store client in the
/// demo binary and in tests; profiles missing from the map resolve to an
/// empty default rather than an error, matching how an unknown user reads
/// from the document store's perspective of this subsystem.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    profiles: Arc<HashMap<String, ProfileRecord>>,
}

impl InMemoryDirectory {
    pub fn new(profiles: HashMap<String, ProfileRecord>) -> Self {
        Self {
            profiles: Arc::new(profiles),
        }
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryDirectory {
    async fn load_connection_count(
        &self, user_id: &str,
    ) -> Result<i64, DirectoryError> {
        Ok(self
            .profiles
            .get(user_id)
            .map(|profile| profile.connection_count)
            .unwrap_or_default())
    }

    async fn load_industries(
        &self, user_id: &str,
    ) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .profiles
            .get(user_id)
            .map(|profile| profile.industries.clone())
            .unwrap_or_default())
    }
}
