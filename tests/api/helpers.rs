use once_cell::sync::Lazy;
use secrecy::Secret;
use std::sync::Arc;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ubch_gateway::configuration::{ApplicationSettings, BureauSettings, SubscriptionsSettings};
use ubch_gateway::domain::session::broker::SessionBroker;
use ubch_gateway::domain::subscriptions::service::Subscriptions;
use ubch_gateway::inbound::http::Application;
use ubch_gateway::outbound::bureau::auth_client::UbchAuthClient;
use ubch_gateway::outbound::bureau::client::UbchClient;
use ubch_gateway::outbound::cache::in_memory::InMemoryTokenCache;
use ubch_gateway::outbound::db::in_memory_db::InMemorySubscriptionStore;
use ubch_gateway::outbound::lock::in_memory::InMemorySessionLock;
use ubch_gateway::outbound::telemetry::init_logger;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info";
    let subscriber_name = "test";
    if std::env::var("TEST_LOG").is_ok() {
        init_logger(subscriber_name, default_filter_level, std::io::stdout);
    } else {
        init_logger(subscriber_name, default_filter_level, std::io::sink);
    };
});

pub struct TestApp {
    pub address: String,
    pub bureau_server: MockServer,
    pub store: InMemorySubscriptionStore,
    pub api_client: reqwest::Client,
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let bureau_server = MockServer::start().await;
    let bureau_settings = BureauSettings {
        base_url: bureau_server.uri(),
        login: "gateway".into(),
        password: Secret::new(Uuid::new_v4().to_string()),
        timeout_milliseconds: 2000,
        session_ttl_seconds: 3600,
        language: "uk".into(),
    };

    let sessions = SessionBroker::new(
        InMemoryTokenCache::new(bureau_settings.session_ttl()),
        InMemorySessionLock::default(),
        UbchAuthClient::new(&bureau_settings),
    );
    let registry = Arc::new(UbchClient::new(&bureau_settings, sessions));
    let store = InMemorySubscriptionStore::new();
    let subscription_service = Subscriptions::new(
        store.clone(),
        registry,
        SubscriptionsSettings {
            itn_salt: Secret::new("test-salt".into()),
            debts_auto_percent: 0,
        },
    );

    let application = Application::build(
        subscription_service,
        ApplicationSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
    )
    .await
    .expect("Failed to bind address");
    let address = format!("http://127.0.0.1:{}", application.port());
    tokio::spawn(application.run_until_stopped());

    TestApp {
        address,
        bureau_server,
        store,
        api_client: reqwest::Client::new(),
    }
}

impl TestApp {
    /// Accepts any number of logins; each handing out the same session id.
    pub async fn mount_bureau_auth(&self) {
        Mock::given(path("/b2b/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sessid": "session-1"
            })))
            .named("bureau auth")
            .mount(&self.bureau_server)
            .await;
    }

    pub async fn mount_bureau_operation(&self, method: &str, response: ResponseTemplate) {
        Mock::given(path("/b2b/subscription"))
            .and(body_partial_json(serde_json::json!({"method": method})))
            .respond_with(response)
            .named(format!("bureau {}", method))
            .mount(&self.bureau_server)
            .await;
    }

    pub async fn post_subscribe(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/subscriptions", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_unsubscribe(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/subscriptions/unsubscribe", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_publish(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/subscriptions/publish", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_subscriber(
        &self,
        subscription_type: &str,
        public_service_code: &str,
        subscription_key: &str,
    ) -> reqwest::Response {
        self.api_client
            .get(format!("{}/subscriptions/subscriber", self.address))
            .query(&[
                ("subscriptionType", subscription_type),
                ("publicServiceCode", public_service_code),
                ("subscriptionKey", subscription_key),
            ])
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
