use crate::domain::subscriptions::models::itn::Itn;
use crate::domain::subscriptions::models::record::{
    PublicServiceCode, SubscriptionCode, UserIdentifier,
};
use crate::domain::subscriptions::models::request::UnsubscribeRequest;
use crate::domain::subscriptions::ports::SubscriptionService;
use crate::inbound::http::errors::AppError;
use crate::inbound::http::state::SharedSubscriptionState;
use actix_web::{web, HttpResponse};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeBody {
    code: SubscriptionCode,
    user_identifier: String,
    itn: String,
    segment_id: Option<String>,
    service_code: Option<PublicServiceCode>,
}

impl TryFrom<UnsubscribeBody> for UnsubscribeRequest {
    type Error = AppError;

    fn try_from(body: UnsubscribeBody) -> Result<Self, Self::Error> {
        let user_identifier = UserIdentifier::parse(body.user_identifier)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        let itn = Itn::parse(body.itn).map_err(|e| AppError::ValidationError(e.to_string()))?;
        Ok(UnsubscribeRequest {
            code: body.code,
            user_identifier,
            itn,
            segment_id: body.segment_id,
            service_code: body.service_code,
        })
    }
}

#[tracing::instrument(
    name = "Handling unsubscribe request",
    skip(body, state),
    fields(code = ?body.code, user_identifier = %body.user_identifier)
)]
pub async fn unsubscribe<SS: SubscriptionService>(
    body: web::Json<UnsubscribeBody>,
    state: web::Data<SharedSubscriptionState<SS>>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().try_into()?;
    state.subscription_service().unsubscribe(request).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}
