//! HTTP request handlers.

pub mod auth_handler;
pub mod demo;
pub mod health;
pub mod metrics;

pub use auth_handler::AppState;
pub use health::health_check;
pub use metrics::metrics_handler;
