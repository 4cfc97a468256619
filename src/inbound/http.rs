use crate::configuration::ApplicationSettings;
use crate::domain::subscriptions::ports::SubscriptionService;
use crate::inbound::http::handlers::{
    health_check, publish, subscribe, subscribed_user, unsubscribe,
};
use crate::inbound::http::state::SharedSubscriptionState;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

mod errors;
mod handlers;
pub mod state;

pub struct Application<SS>
where
    SS: SubscriptionService,
{
    port: u16,
    server: Server,
    subscription_state: SharedSubscriptionState<SS>,
}

fn run<SS: SubscriptionService>(
    listener: TcpListener,
    subscription_state: SharedSubscriptionState<SS>,
) -> Result<Server, std::io::Error> {
    let subscription_state = web::Data::new(subscription_state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .app_data(subscription_state.clone())
            .route("/subscriptions", web::post().to(subscribe::<SS>))
            .route(
                "/subscriptions/unsubscribe",
                web::post().to(unsubscribe::<SS>),
            )
            .route("/subscriptions/publish", web::post().to(publish::<SS>))
            .route(
                "/subscriptions/subscriber",
                web::get().to(subscribed_user::<SS>),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

impl<SS> Application<SS>
where
    SS: SubscriptionService,
{
    pub async fn build(
        subscription_service: SS,
        configuration: ApplicationSettings,
    ) -> Result<Self, std::io::Error> {
        let address = format!("{}:{}", configuration.host, configuration.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr().unwrap().port();

        let subscription_state = SharedSubscriptionState::new(subscription_service);
        let server = run(listener, subscription_state.clone())?;

        Ok(Self {
            port,
            server,
            subscription_state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn subscription_state(&self) -> SharedSubscriptionState<SS> {
        self.subscription_state.clone()
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
