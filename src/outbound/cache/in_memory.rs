use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::session::ports::{TokenCache, TokenCacheError};

/// Single-process token cache for local development and tests.
///
/// The TTL is a property of the cache instance, mirroring a shared cache
/// backend where expiry is configured server-side rather than per call.
#[derive(Debug)]
pub struct InMemoryTokenCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryTokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn get(&self, key: &str) -> Result<Option<String>, TokenCacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, stored_at)| stored_at.elapsed() < self.ttl)
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), TokenCacheError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), Instant::now()));
        Ok(())
    }
}
