pub mod client;
pub mod config;
pub mod error;
pub mod portal;
pub mod store;
pub mod telemetry;
