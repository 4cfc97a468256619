use crate::domain::subscriptions::ports::SubscriptionService;
use std::sync::Arc;

pub struct SubscriptionState<SS: SubscriptionService> {
    subscription_service: SS,
}

pub struct SharedSubscriptionState<SS: SubscriptionService>(Arc<SubscriptionState<SS>>);

impl<SS: SubscriptionService> Clone for SharedSubscriptionState<SS> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<SS: SubscriptionService> SharedSubscriptionState<SS> {
    pub fn new(subscription_service: SS) -> Self {
        Self(Arc::new(SubscriptionState {
            subscription_service,
        }))
    }

    pub fn subscription_service(&self) -> &SS {
        &self.0.subscription_service
    }
}
