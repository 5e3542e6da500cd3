//! Request authentication and authorization.
//!
//! - [`Handshake`] turns an optional token into an [`AuthContext`] (or
//!   anonymous access) by verifying it and loading the session record.
//! - [`AccessDecisionPoint`] checks an optional context against the
//!   [`Requirement`] attached to a route.
//!
//! Neither takes HTTP types. Header parsing and the axum adapters live in
//! `middleware::auth`; [`CurrentIdentity`] is the only extractor here.

pub mod access;
pub mod context;
pub mod handshake;

pub use access::{AccessDecisionPoint, Requirement};
pub use context::{AuthContext, CurrentIdentity};
pub use handshake::{Handshake, HandshakeOutcome};
