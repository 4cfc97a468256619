use super::itn::Itn;
use super::record::{PublicServiceCode, SubscriptionCode, UserIdentifier};

#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    pub code: SubscriptionCode,
    pub user_identifier: UserIdentifier,
    pub itn: Itn,
    pub segment_id: Option<String>,
    pub service_code: Option<PublicServiceCode>,
    pub auto_subscribe: bool,
}

#[derive(Debug, Clone)]
pub struct UnsubscribeRequest {
    pub code: SubscriptionCode,
    pub user_identifier: UserIdentifier,
    pub itn: Itn,
    pub segment_id: Option<String>,
    pub service_code: Option<PublicServiceCode>,
}

#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub code: SubscriptionCode,
    pub user_identifier: UserIdentifier,
    pub itn: Itn,
}
