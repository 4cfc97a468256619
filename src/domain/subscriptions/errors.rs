use super::models::record::SubscriptionCode;
use super::ports::BureauError;

/// Domain errors raised by subscription strategies and the orchestrator.
///
/// Each variant carries a caller-facing process code; the orchestrator
/// propagates them unchanged.
#[derive(thiserror::Error, Debug)]
pub enum SubscriptionServiceError {
    #[error("Failed to subscribe to credit history: {0}")]
    FailedSubscribeCreditHistory(#[source] BureauError),

    #[error("Failed to unsubscribe from credit history: {0}")]
    FailedUnsubscribeCreditHistory(#[source] BureauError),

    #[error("Subscription code {0:?} is not supported")]
    NotSupported(SubscriptionCode),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Subscription state is inconsistent: {0}")]
    InconsistentState(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl SubscriptionServiceError {
    pub fn process_code(&self) -> &'static str {
        match self {
            Self::FailedSubscribeCreditHistory(_) => "failedSubscribeCreditHistory",
            Self::FailedUnsubscribeCreditHistory(_) => "failedUnsubscribeCreditHistory",
            Self::NotSupported(_) => "subscriptionNotSupported",
            Self::BadRequest(_) => "badRequest",
            Self::InconsistentState(_) => "inconsistentSubscriptionState",
            Self::Unexpected(_) => "internalServerError",
        }
    }
}
