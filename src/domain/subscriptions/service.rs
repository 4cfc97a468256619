use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::errors::SubscriptionServiceError;
use super::models::itn::Itn;
use super::models::record::{
    PublicServiceCode, SubscriptionCode, SubscriptionRecord, SubscriptionType, UserIdentifier,
};
use super::models::request::{PublishRequest, SubscribeRequest, UnsubscribeRequest};
use super::ports::{BureauRegistry, SubscriptionService, SubscriptionStore};
use super::strategies::credit_history::CreditHistoryStrategy;
use super::strategies::debts::DebtsStrategy;
use super::strategies::public_service::PublicServiceStrategy;
use super::strategies::{StrategyDecision, SubscriptionStrategy};
use crate::configuration::SubscriptionsSettings;

/// Orchestrates subscription requests: resolves the strategy for the requested
/// code, loads state, invokes the strategy and persists the modifier it
/// returns. All storage writes happen here and nowhere else.
pub struct Subscriptions<R>
where
    R: SubscriptionStore,
{
    repo: R,
    strategies: HashMap<SubscriptionCode, Box<dyn SubscriptionStrategy>>,
    settings: SubscriptionsSettings,
}

impl<R> Subscriptions<R>
where
    R: SubscriptionStore,
{
    pub fn new(
        repo: R,
        registry: Arc<dyn BureauRegistry>,
        settings: SubscriptionsSettings,
    ) -> Self {
        let mut strategies: HashMap<SubscriptionCode, Box<dyn SubscriptionStrategy>> =
            HashMap::new();
        strategies.insert(
            SubscriptionCode::CreditHistory,
            Box::new(CreditHistoryStrategy::new(registry)),
        );
        strategies.insert(
            SubscriptionCode::PublicService,
            Box::new(PublicServiceStrategy),
        );
        strategies.insert(SubscriptionCode::Debts, Box::new(DebtsStrategy));
        Self {
            repo,
            strategies,
            settings,
        }
    }

    fn strategy(
        &self,
        code: SubscriptionCode,
    ) -> Result<&dyn SubscriptionStrategy, SubscriptionServiceError> {
        self.strategies.get(&code).map(Box::as_ref).ok_or_else(|| {
            SubscriptionServiceError::BadRequest(format!(
                "Unsupported subscription code {:?}",
                code
            ))
        })
    }

    async fn load_or_bootstrap(
        &self,
        user: &UserIdentifier,
        itn: &Itn,
    ) -> Result<SubscriptionRecord, SubscriptionServiceError> {
        if let Some(record) = self.repo.find(user).await? {
            return Ok(record);
        }
        let record = SubscriptionRecord::bootstrap(
            user.clone(),
            itn,
            self.settings.itn_salt.expose_secret(),
            self.settings.debts_auto_percent,
        );
        Ok(self.repo.create(record).await?)
    }

    async fn load_or_empty(
        &self,
        user: &UserIdentifier,
    ) -> Result<SubscriptionRecord, SubscriptionServiceError> {
        Ok(self
            .repo
            .find(user)
            .await?
            .unwrap_or_else(|| SubscriptionRecord::empty(user.clone())))
    }

    async fn persist(
        &self,
        user: &UserIdentifier,
        decision: StrategyDecision,
    ) -> Result<(), SubscriptionServiceError> {
        match decision {
            StrategyDecision::NoOp => {
                tracing::info!(user_identifier = %user, "Requested subscription state already holds, skipping");
                Ok(())
            }
            StrategyDecision::Apply(modifier) => {
                self.repo.apply_modifier(user, &modifier).await?;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<R> SubscriptionService for Subscriptions<R>
where
    R: SubscriptionStore,
{
    #[tracing::instrument(
        name = "Processing subscribe request",
        skip(self, request),
        fields(code = ?request.code, user_identifier = %request.user_identifier)
    )]
    async fn subscribe(&self, request: SubscribeRequest) -> Result<(), SubscriptionServiceError> {
        let record = self
            .load_or_bootstrap(&request.user_identifier, &request.itn)
            .await?;
        let decision = self.strategy(request.code)?.subscribe(&record, &request).await?;
        self.persist(&request.user_identifier, decision).await
    }

    #[tracing::instrument(
        name = "Processing unsubscribe request",
        skip(self, request),
        fields(code = ?request.code, user_identifier = %request.user_identifier)
    )]
    async fn unsubscribe(
        &self,
        request: UnsubscribeRequest,
    ) -> Result<(), SubscriptionServiceError> {
        let record = self.load_or_empty(&request.user_identifier).await?;
        let decision = self
            .strategy(request.code)?
            .unsubscribe(&record, &request)
            .await?;
        self.persist(&request.user_identifier, decision).await
    }

    #[tracing::instrument(
        name = "Publishing subscription",
        skip(self, request),
        fields(code = ?request.code, user_identifier = %request.user_identifier)
    )]
    async fn publish_subscription(
        &self,
        request: PublishRequest,
    ) -> Result<(), SubscriptionServiceError> {
        let record = self.load_or_empty(&request.user_identifier).await?;
        self.strategy(request.code)?.publish(&record, &request).await
    }

    async fn subscribed_user(
        &self,
        subscription_type: SubscriptionType,
        service_code: PublicServiceCode,
        subscription_key: &str,
    ) -> Result<Option<UserIdentifier>, SubscriptionServiceError> {
        Ok(self
            .repo
            .find_subscribed_user(subscription_type, service_code, subscription_key)
            .await?)
    }
}
