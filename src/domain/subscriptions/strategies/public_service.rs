use async_trait::async_trait;

use super::{StrategyDecision, SubscriptionStrategy};
use crate::domain::subscriptions::errors::SubscriptionServiceError;
use crate::domain::subscriptions::models::record::{
    Modifier, PublicServiceCode, SubscriptionRecord, SubscriptionType,
};
use crate::domain::subscriptions::models::request::{SubscribeRequest, UnsubscribeRequest};

/// Coarse, non-per-user subscriptions: plain segment-membership bookkeeping
/// with no external call.
pub struct PublicServiceStrategy;

fn required_params<'a>(
    segment_id: &'a Option<String>,
    service_code: &Option<PublicServiceCode>,
) -> Result<(&'a str, PublicServiceCode), SubscriptionServiceError> {
    let segment_id = segment_id.as_deref().ok_or_else(|| {
        SubscriptionServiceError::BadRequest(
            "segmentId is required for public service subscriptions".into(),
        )
    })?;
    let service_code = service_code.ok_or_else(|| {
        SubscriptionServiceError::BadRequest(
            "serviceCode is required for public service subscriptions".into(),
        )
    })?;
    Ok((segment_id, service_code))
}

#[async_trait]
impl SubscriptionStrategy for PublicServiceStrategy {
    async fn subscribe(
        &self,
        record: &SubscriptionRecord,
        request: &SubscribeRequest,
    ) -> Result<StrategyDecision, SubscriptionServiceError> {
        let (segment_id, service_code) =
            required_params(&request.segment_id, &request.service_code)?;

        if record.has_segment(SubscriptionType::PublicServices, service_code, segment_id) {
            return Ok(StrategyDecision::NoOp);
        }
        Ok(StrategyDecision::Apply(Modifier::new().add_segment(
            SubscriptionType::PublicServices,
            service_code,
            segment_id.to_string(),
        )))
    }

    async fn unsubscribe(
        &self,
        record: &SubscriptionRecord,
        request: &UnsubscribeRequest,
    ) -> Result<StrategyDecision, SubscriptionServiceError> {
        let (segment_id, service_code) =
            required_params(&request.segment_id, &request.service_code)?;

        if !record.has_segment(SubscriptionType::PublicServices, service_code, segment_id) {
            return Ok(StrategyDecision::NoOp);
        }
        Ok(StrategyDecision::Apply(Modifier::new().remove_segment(
            SubscriptionType::PublicServices,
            service_code,
            segment_id.to_string(),
        )))
    }
}
