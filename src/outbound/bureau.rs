pub mod auth_client;
pub mod client;
