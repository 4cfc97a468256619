use async_trait::async_trait;
use reqwest::Client;

use crate::configuration::BureauSettings;
use crate::domain::session::broker::SessionProvider;
use crate::domain::subscriptions::models::itn::Itn;
use crate::domain::subscriptions::models::record::BureauSubscriptionId;
use crate::domain::subscriptions::ports::{BureauError, BureauRegistry};

/// Status the bureau uses to signal that the session id is no longer valid.
const SESSION_EXPIRED_STATUS: u16 = 410;

const SUBSCRIBE_METHOD: &str = "subscribe";
const UNSUBSCRIBE_METHOD: &str = "unsubscribe";
const PUBLISH_METHOD: &str = "publish";

/// Authenticated client for the bureau's subscription registry.
///
/// Every call embeds a session token from the broker; a `410` response forces
/// one token refresh and replays the call exactly once.
#[derive(Debug)]
pub struct UbchClient<P>
where
    P: SessionProvider,
{
    http_client: Client,
    base_url: String,
    language: String,
    sessions: P,
}

impl<P> UbchClient<P>
where
    P: SessionProvider,
{
    pub fn new(configuration: &BureauSettings, sessions: P) -> Self {
        let http_client = Client::builder()
            .timeout(configuration.timeout())
            .build()
            .unwrap();
        Self {
            http_client,
            base_url: configuration.base_url.clone(),
            language: configuration.language.clone(),
            sessions,
        }
    }

    async fn send(
        &self,
        operation: &str,
        itn: &Itn,
        subscription_id: Option<&BureauSubscriptionId>,
        force_refresh: bool,
    ) -> Result<reqwest::Response, BureauError> {
        let session = self.sessions.session(force_refresh).await?;
        let url = format!("{}/b2b/subscription", self.base_url);
        let request_body = SubscriptionRequest {
            sessid: session.expose(),
            lng: &self.language,
            method: operation,
            itn: itn.as_ref(),
            sub_id: subscription_id.map(AsRef::as_ref),
        };
        self.http_client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(operation, error = %e, "Bureau registry transport failure");
                BureauError::UpstreamUnavailable(e.into())
            })
    }

    async fn dispatch(
        &self,
        operation: &str,
        itn: &Itn,
        subscription_id: Option<&BureauSubscriptionId>,
    ) -> Result<serde_json::Value, BureauError> {
        let mut response = self.send(operation, itn, subscription_id, false).await?;
        if response.status().as_u16() == SESSION_EXPIRED_STATUS {
            // The cached session went stale; one forced refresh, one replay.
            tracing::warn!(operation, "Bureau session expired, refreshing and retrying once");
            response = self.send(operation, itn, subscription_id, true).await?;
            if response.status().as_u16() == SESSION_EXPIRED_STATUS {
                return Err(BureauError::AuthFailure {
                    diagnostics: "session rejected again after a forced refresh".into(),
                });
            }
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                operation,
                status = status.as_u16(),
                body = %body,
                "Bureau registry returned an unexpected status"
            );
            return Err(BureauError::UpstreamUnknown {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BureauError::UpstreamProtocol(format!("undecodable response body: {}", e)))
    }
}

#[async_trait]
impl<P> BureauRegistry for UbchClient<P>
where
    P: SessionProvider,
{
    #[tracing::instrument(name = "Subscribing taxpayer in the bureau registry", skip(self, itn))]
    async fn subscribe(&self, itn: &Itn) -> Result<BureauSubscriptionId, BureauError> {
        let payload = self.dispatch(SUBSCRIBE_METHOD, itn, None).await?;
        let subscription_id = payload
            .get("subId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                tracing::error!(response = %payload, "Subscribe response carries no subscription id");
                BureauError::UpstreamProtocol("subscribe response is missing subId".into())
            })?;
        Ok(BureauSubscriptionId::new(subscription_id.to_string()))
    }

    #[tracing::instrument(
        name = "Unsubscribing taxpayer from the bureau registry",
        skip(self, itn, subscription_id)
    )]
    async fn unsubscribe(
        &self,
        itn: &Itn,
        subscription_id: &BureauSubscriptionId,
    ) -> Result<(), BureauError> {
        self.dispatch(UNSUBSCRIBE_METHOD, itn, Some(subscription_id))
            .await?;
        Ok(())
    }

    #[tracing::instrument(name = "Publishing taxpayer subscription to the bureau", skip(self, itn))]
    async fn publish(&self, itn: &Itn) -> Result<(), BureauError> {
        self.dispatch(PUBLISH_METHOD, itn, None).await?;
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct SubscriptionRequest<'a> {
    sessid: &'a str,
    lng: &'a str,
    method: &'a str,
    itn: &'a str,
    #[serde(rename = "subId", skip_serializing_if = "Option::is_none")]
    sub_id: Option<&'a str>,
}
