use crate::domain::subscriptions::errors::SubscriptionServiceError;
use crate::domain::subscriptions::ports::BureauError;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Service(#[from] SubscriptionServiceError),
}

impl AppError {
    fn process_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "badRequest",
            AppError::Service(error) => error.process_code(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Service(error) => match error {
                SubscriptionServiceError::BadRequest(_)
                | SubscriptionServiceError::NotSupported(_) => StatusCode::BAD_REQUEST,
                SubscriptionServiceError::FailedSubscribeCreditHistory(bureau)
                | SubscriptionServiceError::FailedUnsubscribeCreditHistory(bureau) => match bureau {
                    BureauError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::SERVICE_UNAVAILABLE,
                },
                SubscriptionServiceError::InconsistentState(_)
                | SubscriptionServiceError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "code": self.process_code(),
        }))
    }
}
