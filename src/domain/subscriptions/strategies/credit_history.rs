use std::sync::Arc;

use async_trait::async_trait;

use super::{StrategyDecision, SubscriptionStrategy};
use crate::domain::subscriptions::errors::SubscriptionServiceError;
use crate::domain::subscriptions::models::record::{
    Modifier, PublicServiceCode, SubscriptionRecord, SubscriptionSource, SubscriptionType,
};
use crate::domain::subscriptions::models::request::{
    PublishRequest, SubscribeRequest, UnsubscribeRequest,
};
use crate::domain::subscriptions::ports::BureauRegistry;

const TYPE: SubscriptionType = SubscriptionType::PublicServices;
const CODE: PublicServiceCode = PublicServiceCode::CreditHistory;

/// Credit history subscriptions are mirrored in the bureau registry: the push
/// flag and the bureau-issued subscription id always move together.
pub struct CreditHistoryStrategy {
    registry: Arc<dyn BureauRegistry>,
}

impl CreditHistoryStrategy {
    pub fn new(registry: Arc<dyn BureauRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl SubscriptionStrategy for CreditHistoryStrategy {
    #[tracing::instrument(
        name = "Subscribing user to credit history",
        skip(self, record, request),
        fields(user_identifier = %request.user_identifier, auto_subscribe = request.auto_subscribe)
    )]
    async fn subscribe(
        &self,
        record: &SubscriptionRecord,
        request: &SubscribeRequest,
    ) -> Result<StrategyDecision, SubscriptionServiceError> {
        let explicit_key = request.user_identifier.subscription_key();
        let auto_key = request.user_identifier.auto_subscription_key();
        let explicit = record.push_flag(TYPE, CODE, &explicit_key);
        let auto = record.push_flag(TYPE, CODE, &auto_key);

        let already_subscribed = if request.auto_subscribe {
            explicit || auto
        } else {
            explicit
        };
        if already_subscribed {
            return Ok(StrategyDecision::NoOp);
        }

        let subscription_id = self
            .registry
            .subscribe(&request.itn)
            .await
            .map_err(SubscriptionServiceError::FailedSubscribeCreditHistory)?;

        let mut modifier = Modifier::new()
            .set_push_flag(TYPE, CODE, explicit_key, true)
            .set_subscription_id(SubscriptionSource::Ubch, subscription_id);
        if request.auto_subscribe {
            modifier = modifier.set_push_flag(TYPE, CODE, auto_key, true);
        }
        Ok(StrategyDecision::Apply(modifier))
    }

    #[tracing::instrument(
        name = "Unsubscribing user from credit history",
        skip(self, record, request),
        fields(user_identifier = %request.user_identifier)
    )]
    async fn unsubscribe(
        &self,
        record: &SubscriptionRecord,
        request: &UnsubscribeRequest,
    ) -> Result<StrategyDecision, SubscriptionServiceError> {
        let explicit_key = request.user_identifier.subscription_key();
        let auto_key = request.user_identifier.auto_subscription_key();
        if !record.push_flag(TYPE, CODE, &explicit_key) && !record.push_flag(TYPE, CODE, &auto_key)
        {
            return Ok(StrategyDecision::NoOp);
        }

        let subscription_id = match record.subscription_id(SubscriptionSource::Ubch) {
            Some(id) => id,
            None => {
                tracing::error!(
                    user_identifier = %request.user_identifier,
                    "Active credit history flag without a stored bureau subscription id"
                );
                return Err(SubscriptionServiceError::InconsistentState(format!(
                    "user {} holds an active credit history flag but no bureau subscription id",
                    request.user_identifier
                )));
            }
        };

        self.registry
            .unsubscribe(&request.itn, subscription_id)
            .await
            .map_err(SubscriptionServiceError::FailedUnsubscribeCreditHistory)?;

        Ok(StrategyDecision::Apply(
            Modifier::new()
                .set_push_flag(TYPE, CODE, explicit_key, false)
                .set_push_flag(TYPE, CODE, auto_key, false)
                .unset_subscription_id(SubscriptionSource::Ubch),
        ))
    }

    #[tracing::instrument(
        name = "Publishing credit history subscription",
        skip(self, _record, request),
        fields(user_identifier = %request.user_identifier)
    )]
    async fn publish(
        &self,
        _record: &SubscriptionRecord,
        request: &PublishRequest,
    ) -> Result<(), SubscriptionServiceError> {
        self.registry
            .publish(&request.itn)
            .await
            .map_err(SubscriptionServiceError::FailedSubscribeCreditHistory)?;
        Ok(())
    }
}
