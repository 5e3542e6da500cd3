//! Token authentication service.
//!
//! Password login issues an HS256 token whose subject keys a cached session
//! record. Every request runs a handshake that verifies the token and
//! restores the identity from that record, and each route states the
//! authority it needs.
//!
//! # Modules
//!
//! - `auth` - handshake, request context, access decisions
//! - `config` - service configuration
//! - `crypto` - token codec and password verification
//! - `errors` - error type and HTTP error envelope
//! - `handlers` - HTTP request handlers
//! - `middleware` - axum adapters for authentication and metrics
//! - `models` - identity and wire types
//! - `repositories` - user directory
//! - `routes` - router assembly
//! - `services` - login and logout
//! - `session` - session cache and its backends

pub mod auth;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod session;
