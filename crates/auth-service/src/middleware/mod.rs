pub mod auth;
pub mod http_metrics;

pub use auth::{authenticate, enforce, extract_token, AuthState, LEGACY_TOKEN_HEADER};
pub use http_metrics::http_metrics_middleware;
