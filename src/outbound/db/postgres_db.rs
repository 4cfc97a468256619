use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::configuration::DatabaseSettings;
use crate::domain::subscriptions::models::record::{
    Modifier, PublicServiceCode, SubscriptionRecord, SubscriptionType, UserIdentifier,
};
use crate::domain::subscriptions::ports::{SubscriptionStore, SubscriptionStoreError};

/// Postgres-backed subscription store.
///
/// Records are persisted as one JSONB document per user; modifiers are applied
/// read-modify-write inside a transaction holding the row lock, so each
/// modifier lands as a single atomic update.
#[derive(Clone, Debug)]
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    pub fn new(configuration: &DatabaseSettings) -> PostgresSubscriptionStore {
        PostgresSubscriptionStore {
            pool: PgPoolOptions::new()
                .acquire_timeout(std::time::Duration::from_secs(2))
                .connect_lazy_with(configuration.with_db()),
        }
    }
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    #[tracing::instrument(name = "Fetching subscription record", skip(self))]
    async fn find(
        &self,
        user: &UserIdentifier,
    ) -> Result<Option<SubscriptionRecord>, SubscriptionStoreError> {
        let row: Option<Json<SubscriptionRecord>> = sqlx::query_scalar(
            "SELECT record FROM subscriptions WHERE user_identifier = $1",
        )
        .bind(user.as_ref())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch a subscription record")?;

        Ok(row.map(|Json(record)| record))
    }

    #[tracing::instrument(name = "Creating subscription record", skip(self, record), fields(user_identifier = %record.user_identifier))]
    async fn create(
        &self,
        record: SubscriptionRecord,
    ) -> Result<SubscriptionRecord, SubscriptionStoreError> {
        let now = Utc::now();
        sqlx::query(
            r#"
        INSERT INTO subscriptions (user_identifier, record, created_at, updated_at)
        VALUES ($1, $2, $3, $3)
        ON CONFLICT (user_identifier) DO NOTHING
                "#,
        )
        .bind(record.user_identifier.as_ref())
        .bind(Json(&record))
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert a subscription record")?;

        // A concurrent creator may have won the insert; the stored row is
        // authoritative either way.
        let stored = self.find(&record.user_identifier).await?;
        Ok(stored.unwrap_or(record))
    }

    #[tracing::instrument(name = "Applying subscription modifier", skip(self, modifier))]
    async fn apply_modifier(
        &self,
        user: &UserIdentifier,
        modifier: &Modifier,
    ) -> Result<(), SubscriptionStoreError> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .context("Failed to open a transaction")?;

        let row: Option<Json<SubscriptionRecord>> = sqlx::query_scalar(
            "SELECT record FROM subscriptions WHERE user_identifier = $1 FOR UPDATE",
        )
        .bind(user.as_ref())
        .fetch_optional(&mut *transaction)
        .await
        .context("Failed to fetch a subscription record for update")?;

        let mut record = row
            .map(|Json(record)| record)
            .unwrap_or_else(|| SubscriptionRecord::empty(user.clone()));
        record.apply(modifier);

        sqlx::query(
            r#"
        INSERT INTO subscriptions (user_identifier, record, created_at, updated_at)
        VALUES ($1, $2, $3, $3)
        ON CONFLICT (user_identifier)
        DO UPDATE SET record = EXCLUDED.record, updated_at = EXCLUDED.updated_at
                "#,
        )
        .bind(user.as_ref())
        .bind(Json(&record))
        .bind(Utc::now())
        .execute(&mut *transaction)
        .await
        .context("Failed to store the updated subscription record")?;

        transaction
            .commit()
            .await
            .context("Failed to commit the subscription update")?;
        Ok(())
    }

    #[tracing::instrument(name = "Looking up subscribed user", skip(self))]
    async fn find_subscribed_user(
        &self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        subscription_key: &str,
    ) -> Result<Option<UserIdentifier>, SubscriptionStoreError> {
        let row: Option<Json<SubscriptionRecord>> = sqlx::query_scalar(
            r#"
        SELECT record FROM subscriptions
        WHERE (record #>> ARRAY['push', $1, $2, $3])::boolean IS TRUE
        LIMIT 1
                "#,
        )
        .bind(subscription_type.as_str())
        .bind(service_code.as_str())
        .bind(subscription_key)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up a subscribed user")?;

        Ok(row.map(|Json(record)| record.user_identifier))
    }
}
