use std::{collections::HashSet, sync::Arc};

use cache_strategy::{CacheManager, KeyType};
use directory_traits::ProfileDirectory;
use network_cache_keys::CacheEntryKey;
use network_errors::{NetworkError, NetworkResult};
use redis_connection::KeyValueStore;

/// Industry lookups for delta fan-out, read through the cache so a burst
/// of connection activity does not hammer the document store.
pub struct IndustryReader<S, D> {
    cache: Arc<CacheManager<S>>,
    directory: Arc<D>,
}

impl<S, D> IndustryReader<S, D>
where
    S: KeyValueStore + 'static,
    D: ProfileDirectory + 'static,
{
    pub fn new(cache: Arc<CacheManager<S>>, directory: Arc<D>) -> Self {
        Self { cache, directory }
    }

    pub async fn industries_of(
        &self, user_id: &str,
    ) -> NetworkResult<Vec<String>> {
        let key = CacheEntryKey::of((KeyType::IndustryList.as_str(), user_id));
        let directory = self.directory.clone();
        let user_id_owned = user_id.to_string();
        self.cache
            .read(&key, KeyType::IndustryList, move || {
                async move {
                    directory.load_industries(&user_id_owned).await
                }
            })
            .await
            .map_err(|e| NetworkError::Internal(e.to_string()))
    }

    /// Industries both users declare, in `a`'s declaration order. A delta
    /// is only visible where the two sides overlap.
    pub async fn shared_industries(
        &self, a: &str, b: &str,
    ) -> NetworkResult<Vec<String>> {
        let a_industries = self.industries_of(a).await?;
        let b_industries: HashSet<String> =
            self.industries_of(b).await?.into_iter().collect();
        Ok(a_industries
            .into_iter()
            .filter(|industry| b_industries.contains(industry))
            .collect())
    }
}
