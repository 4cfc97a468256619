use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::subscriptions::models::record::{
    Modifier, PublicServiceCode, SubscriptionRecord, SubscriptionType, UserIdentifier,
};
use crate::domain::subscriptions::ports::{SubscriptionStore, SubscriptionStoreError};

/// Thread-safe in-memory subscription store for local development and tests.
#[derive(Clone, Debug, Default)]
pub struct InMemorySubscriptionStore {
    records: Arc<RwLock<HashMap<UserIdentifier, SubscriptionRecord>>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn find(
        &self,
        user: &UserIdentifier,
    ) -> Result<Option<SubscriptionRecord>, SubscriptionStoreError> {
        Ok(self.records.read().await.get(user).cloned())
    }

    async fn create(
        &self,
        record: SubscriptionRecord,
    ) -> Result<SubscriptionRecord, SubscriptionStoreError> {
        let mut records = self.records.write().await;
        let stored = records
            .entry(record.user_identifier.clone())
            .or_insert(record);
        Ok(stored.clone())
    }

    async fn apply_modifier(
        &self,
        user: &UserIdentifier,
        modifier: &Modifier,
    ) -> Result<(), SubscriptionStoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(user.clone())
            .or_insert_with(|| SubscriptionRecord::empty(user.clone()));
        record.apply(modifier);
        Ok(())
    }

    async fn find_subscribed_user(
        &self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        subscription_key: &str,
    ) -> Result<Option<UserIdentifier>, SubscriptionStoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|record| record.push_flag(subscription_type, service_code, subscription_key))
            .map(|record| record.user_identifier.clone()))
    }
}
