use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::session::ports::{SessionLock, SessionLockError};

/// Single-process lock registry keyed by string.
///
/// Offers the same acquire/release contract as a distributed lock service;
/// the guard releases the key when dropped.
#[derive(Debug, Default)]
pub struct InMemorySessionLock {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

#[async_trait]
impl SessionLock for InMemorySessionLock {
    type Guard = OwnedMutexGuard<()>;

    async fn acquire(&self, key: &str) -> Result<Self::Guard, SessionLockError> {
        let entry = self
            .locks
            .lock()
            .await
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Ok(entry.lock_owned().await)
    }
}
