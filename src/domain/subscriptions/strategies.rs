pub mod credit_history;
pub mod debts;
pub mod public_service;

use async_trait::async_trait;

use super::errors::SubscriptionServiceError;
use super::models::record::{Modifier, SubscriptionRecord};
use super::models::request::{PublishRequest, SubscribeRequest, UnsubscribeRequest};

/// Outcome of a strategy decision.
#[derive(Debug)]
pub enum StrategyDecision {
    /// Change set for the orchestrator to persist.
    Apply(Modifier),
    /// The requested state already holds; nothing to call, nothing to write.
    NoOp,
}

/// Business rule for one subscription code: decides whether an action is
/// necessary and computes the storage modifier to apply.
///
/// Strategies never receive a writable handle to the record.
#[async_trait]
pub trait SubscriptionStrategy: Send + Sync + 'static {
    async fn subscribe(
        &self,
        record: &SubscriptionRecord,
        request: &SubscribeRequest,
    ) -> Result<StrategyDecision, SubscriptionServiceError>;

    async fn unsubscribe(
        &self,
        _record: &SubscriptionRecord,
        request: &UnsubscribeRequest,
    ) -> Result<StrategyDecision, SubscriptionServiceError> {
        Err(SubscriptionServiceError::NotSupported(request.code))
    }

    async fn publish(
        &self,
        _record: &SubscriptionRecord,
        request: &PublishRequest,
    ) -> Result<(), SubscriptionServiceError> {
        Err(SubscriptionServiceError::NotSupported(request.code))
    }
}
