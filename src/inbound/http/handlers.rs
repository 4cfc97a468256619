pub mod health_check;
pub mod publish;
pub mod subscribe;
pub mod subscriber;
pub mod unsubscribe;

pub use health_check::health_check;
pub use publish::publish;
pub use subscribe::subscribe;
pub use subscriber::subscribed_user;
pub use unsubscribe::unsubscribe;
