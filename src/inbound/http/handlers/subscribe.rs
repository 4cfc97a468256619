use crate::domain::subscriptions::models::itn::Itn;
use crate::domain::subscriptions::models::record::{
    PublicServiceCode, SubscriptionCode, UserIdentifier,
};
use crate::domain::subscriptions::models::request::SubscribeRequest;
use crate::domain::subscriptions::ports::SubscriptionService;
use crate::inbound::http::errors::AppError;
use crate::inbound::http::state::SharedSubscriptionState;
use actix_web::{web, HttpResponse};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeBody {
    code: SubscriptionCode,
    user_identifier: String,
    itn: String,
    segment_id: Option<String>,
    service_code: Option<PublicServiceCode>,
    #[serde(default)]
    auto_subscribe: bool,
}

impl TryFrom<SubscribeBody> for SubscribeRequest {
    type Error = AppError;

    fn try_from(body: SubscribeBody) -> Result<Self, Self::Error> {
        let user_identifier = UserIdentifier::parse(body.user_identifier)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        let itn = Itn::parse(body.itn).map_err(|e| AppError::ValidationError(e.to_string()))?;
        Ok(SubscribeRequest {
            code: body.code,
            user_identifier,
            itn,
            segment_id: body.segment_id,
            service_code: body.service_code,
            auto_subscribe: body.auto_subscribe,
        })
    }
}

#[tracing::instrument(
    name = "Handling subscribe request",
    skip(body, state),
    fields(code = ?body.code, user_identifier = %body.user_identifier)
)]
pub async fn subscribe<SS: SubscriptionService>(
    body: web::Json<SubscribeBody>,
    state: web::Data<SharedSubscriptionState<SS>>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().try_into()?;
    state.subscription_service().subscribe(request).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}
