use async_trait::async_trait;

use super::{StrategyDecision, SubscriptionStrategy};
use crate::domain::subscriptions::errors::SubscriptionServiceError;
use crate::domain::subscriptions::models::record::SubscriptionRecord;
use crate::domain::subscriptions::models::request::SubscribeRequest;

/// Deliberate placeholder: debts subscriptions are only ever created by the
/// automatic bootstrap flag and cannot be requested through this service.
pub struct DebtsStrategy;

#[async_trait]
impl SubscriptionStrategy for DebtsStrategy {
    async fn subscribe(
        &self,
        _record: &SubscriptionRecord,
        request: &SubscribeRequest,
    ) -> Result<StrategyDecision, SubscriptionServiceError> {
        Err(SubscriptionServiceError::NotSupported(request.code))
    }
}
