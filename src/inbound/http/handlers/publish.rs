use crate::domain::subscriptions::models::itn::Itn;
use crate::domain::subscriptions::models::record::{SubscriptionCode, UserIdentifier};
use crate::domain::subscriptions::models::request::PublishRequest;
use crate::domain::subscriptions::ports::SubscriptionService;
use crate::inbound::http::errors::AppError;
use crate::inbound::http::state::SharedSubscriptionState;
use actix_web::{web, HttpResponse};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishBody {
    code: SubscriptionCode,
    user_identifier: String,
    itn: String,
}

impl TryFrom<PublishBody> for PublishRequest {
    type Error = AppError;

    fn try_from(body: PublishBody) -> Result<Self, Self::Error> {
        let user_identifier = UserIdentifier::parse(body.user_identifier)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        let itn = Itn::parse(body.itn).map_err(|e| AppError::ValidationError(e.to_string()))?;
        Ok(PublishRequest {
            code: body.code,
            user_identifier,
            itn,
        })
    }
}

#[tracing::instrument(
    name = "Handling publish request",
    skip(body, state),
    fields(code = ?body.code, user_identifier = %body.user_identifier)
)]
pub async fn publish<SS: SubscriptionService>(
    body: web::Json<PublishBody>,
    state: web::Data<SharedSubscriptionState<SS>>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().try_into()?;
    state
        .subscription_service()
        .publish_subscription(request)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}
