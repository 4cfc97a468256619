use std::sync::Arc;

use ubch_gateway::configuration::get_configuration;
use ubch_gateway::domain::session::broker::SessionBroker;
use ubch_gateway::domain::subscriptions::service::Subscriptions;
use ubch_gateway::inbound::http::Application;
use ubch_gateway::outbound::bureau::auth_client::UbchAuthClient;
use ubch_gateway::outbound::bureau::client::UbchClient;
use ubch_gateway::outbound::cache::in_memory::InMemoryTokenCache;
use ubch_gateway::outbound::db::postgres_db::PostgresSubscriptionStore;
use ubch_gateway::outbound::lock::in_memory::InMemorySessionLock;
use ubch_gateway::outbound::telemetry::init_logger;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration().expect("Failed to read configuration");
    init_logger("ubch-gateway", &configuration.log_level(), std::io::stdout);

    let sessions = SessionBroker::new(
        InMemoryTokenCache::new(configuration.bureau.session_ttl()),
        InMemorySessionLock::default(),
        UbchAuthClient::new(&configuration.bureau),
    );
    let registry = Arc::new(UbchClient::new(&configuration.bureau, sessions));
    let subscription_repo = PostgresSubscriptionStore::new(&configuration.database);
    let subscription_service = Subscriptions::new(
        subscription_repo,
        registry,
        configuration.subscriptions.clone(),
    );
    let application =
        Application::build(subscription_service, configuration.application.clone()).await?;

    application.run_until_stopped().await?;
    Ok(())
}
