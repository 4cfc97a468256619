use crate::domain::subscriptions::models::record::{PublicServiceCode, SubscriptionType};
use crate::domain::subscriptions::ports::SubscriptionService;
use crate::inbound::http::errors::AppError;
use crate::inbound::http::state::SharedSubscriptionState;
use actix_web::{web, HttpResponse};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberQuery {
    subscription_type: SubscriptionType,
    public_service_code: PublicServiceCode,
    subscription_key: String,
}

/// Point lookup of the user holding an active flag; no side effects.
#[tracing::instrument(name = "Looking up subscribed user", skip(query, state))]
pub async fn subscribed_user<SS: SubscriptionService>(
    query: web::Query<SubscriberQuery>,
    state: web::Data<SharedSubscriptionState<SS>>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let user = state
        .subscription_service()
        .subscribed_user(
            query.subscription_type,
            query.public_service_code,
            &query.subscription_key,
        )
        .await?;

    match user {
        Some(user) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({"userIdentifier": user.as_ref()})))
        }
        None => Ok(HttpResponse::NotFound().finish()),
    }
}
