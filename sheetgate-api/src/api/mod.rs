//! HTTP API handlers for sheetgate-api

pub mod health;
pub mod subscriber;

pub use health::health_routes;
pub use subscriber::check_subscriber;
