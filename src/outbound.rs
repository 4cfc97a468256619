pub mod bureau;
pub mod cache;
pub mod db;
pub mod lock;
pub mod telemetry;
