use async_trait::async_trait;

use super::errors::SubscriptionServiceError;
use super::models::itn::Itn;
use super::models::record::{
    BureauSubscriptionId, Modifier, PublicServiceCode, SubscriptionRecord, SubscriptionType,
    UserIdentifier,
};
use super::models::request::{PublishRequest, SubscribeRequest, UnsubscribeRequest};
use crate::domain::session::ports::SessionError;

/// Represents the store of per-user subscription records.
#[async_trait]
pub trait SubscriptionStore: Send + Sync + 'static {
    async fn find(
        &self,
        user: &UserIdentifier,
    ) -> Result<Option<SubscriptionRecord>, SubscriptionStoreError>;

    /// Inserts the record unless one already exists; returns the stored one.
    async fn create(
        &self,
        record: SubscriptionRecord,
    ) -> Result<SubscriptionRecord, SubscriptionStoreError>;

    /// Applies a modifier to the user's record as a single atomic update.
    async fn apply_modifier(
        &self,
        user: &UserIdentifier,
        modifier: &Modifier,
    ) -> Result<(), SubscriptionStoreError>;

    /// Point lookup of the user holding an active flag under the given key.
    async fn find_subscribed_user(
        &self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        subscription_key: &str,
    ) -> Result<Option<UserIdentifier>, SubscriptionStoreError>;
}

#[derive(thiserror::Error, Debug)]
#[error("Subscription store failure: {0}")]
pub struct SubscriptionStoreError(#[from] pub anyhow::Error);

impl From<SubscriptionStoreError> for SubscriptionServiceError {
    fn from(error: SubscriptionStoreError) -> Self {
        Self::Unexpected(error.into())
    }
}

/// Authenticated operations against the external credit bureau registry.
#[async_trait]
pub trait BureauRegistry: Send + Sync + 'static {
    async fn subscribe(&self, itn: &Itn) -> Result<BureauSubscriptionId, BureauError>;

    async fn unsubscribe(
        &self,
        itn: &Itn,
        subscription_id: &BureauSubscriptionId,
    ) -> Result<(), BureauError>;

    /// Fire-and-forget publication; no identifier is returned.
    async fn publish(&self, itn: &Itn) -> Result<(), BureauError>;
}

#[derive(thiserror::Error, Debug)]
pub enum BureauError {
    #[error("Bureau authentication failed: {diagnostics}")]
    AuthFailure { diagnostics: String },

    #[error("Bureau registry unreachable: {0}")]
    UpstreamUnavailable(#[source] anyhow::Error),

    #[error("Bureau registry returned an unexpected status {status}: {body}")]
    UpstreamUnknown { status: u16, body: String },

    #[error("Bureau response violates the expected shape: {0}")]
    UpstreamProtocol(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<SessionError> for BureauError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::AuthFailure(login) => Self::AuthFailure {
                diagnostics: login.diagnostics,
            },
            SessionError::Unexpected(e) => Self::Unexpected(e),
        }
    }
}

/// The subscription orchestrator's caller-facing contract.
#[async_trait]
pub trait SubscriptionService: Send + Sync + 'static {
    async fn subscribe(&self, request: SubscribeRequest) -> Result<(), SubscriptionServiceError>;

    async fn unsubscribe(
        &self,
        request: UnsubscribeRequest,
    ) -> Result<(), SubscriptionServiceError>;

    async fn publish_subscription(
        &self,
        request: PublishRequest,
    ) -> Result<(), SubscriptionServiceError>;

    async fn subscribed_user(
        &self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        subscription_key: &str,
    ) -> Result<Option<UserIdentifier>, SubscriptionServiceError>;
}
