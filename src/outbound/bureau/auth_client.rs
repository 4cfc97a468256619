use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::configuration::BureauSettings;
use crate::domain::session::ports::{LoginError, SessionSource, SessionToken};

/// Performs the bureau login call; the broker owns when it happens.
#[derive(Debug)]
pub struct UbchAuthClient {
    http_client: Client,
    base_url: String,
    login: String,
    password: Secret<String>,
}

impl UbchAuthClient {
    pub fn new(configuration: &BureauSettings) -> Self {
        let http_client = Client::builder()
            .timeout(configuration.timeout())
            .build()
            .unwrap();
        Self {
            http_client,
            base_url: configuration.base_url.clone(),
            login: configuration.login.clone(),
            password: configuration.password.clone(),
        }
    }
}

#[async_trait]
impl SessionSource for UbchAuthClient {
    #[tracing::instrument(name = "Logging in to the bureau", skip(self))]
    async fn login(&self) -> Result<SessionToken, LoginError> {
        let url = format!("{}/b2b/auth", self.base_url);
        let request_body = AuthRequest {
            login: &self.login,
            password: self.password.expose_secret(),
        };
        let response = self
            .http_client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LoginError {
                diagnostics: format!("auth transport failure: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LoginError {
                diagnostics: format!("auth returned {}: {}", status.as_u16(), body),
            });
        }

        let payload: AuthResponse = response.json().await.map_err(|e| LoginError {
            diagnostics: format!("malformed auth response: {}", e),
        })?;
        Ok(SessionToken::new(payload.sessid))
    }
}

#[derive(serde::Serialize)]
struct AuthRequest<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(serde::Deserialize)]
struct AuthResponse {
    sessid: String,
}
