//! Authentication and authorization middleware.
//!
//! - `extract_token` reads the credential from the request headers.
//! - `authenticate` runs the handshake once per request and publishes the
//!   resulting [`AuthContext`] in request extensions. Anonymous requests pass
//!   through untouched.
//! - `enforce` applies a route's [`Requirement`] to whatever `authenticate`
//!   published. Attach it per route group with `from_fn_with_state`.

use crate::auth::{AccessDecisionPoint, AuthContext, Handshake, HandshakeOutcome, Requirement};
use crate::errors::AuthError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// Header used by older clients that send the raw token without a scheme.
pub const LEGACY_TOKEN_HEADER: &str = "token";

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token from `Authorization: Bearer <t>`, falling back to the
/// legacy `token` header only when `Authorization` is absent.
///
/// The scheme is matched case-insensitively. Blank values count as absent.
///
/// # Errors
///
/// `TokenInvalid` when `Authorization` is present but is not readable text
/// or carries a scheme other than Bearer.
pub fn extract_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| {
            tracing::debug!(target: "auth.middleware", "Authorization header is not valid text");
            AuthError::TokenInvalid("Invalid Authorization header format".to_string())
        })?;

        if value.trim().is_empty() {
            return Ok(None);
        }

        let scheme_matches = value
            .get(..BEARER_PREFIX.len())
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case(BEARER_PREFIX));
        if !scheme_matches {
            tracing::debug!(target: "auth.middleware", "Authorization header without Bearer scheme");
            return Err(AuthError::TokenInvalid(
                "Invalid Authorization header format".to_string(),
            ));
        }

        let token = value.get(BEARER_PREFIX.len()..).unwrap_or_default().trim();
        return Ok(Some(token).filter(|t| !t.is_empty()));
    }

    let legacy = headers
        .get(LEGACY_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());
    Ok(legacy)
}

#[derive(Clone)]
pub struct AuthState {
    pub handshake: Handshake,
}

#[instrument(skip_all, name = "auth.middleware.authenticate")]
pub async fn authenticate(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token(req.headers())?.map(str::to_owned);

    match state.handshake.run(token.as_deref()).await? {
        HandshakeOutcome::Anonymous => {
            tracing::trace!(target: "auth.middleware", "No token presented");
        }
        HandshakeOutcome::Authenticated(ctx) => {
            req.extensions_mut().insert(ctx);
        }
    }

    Ok(next.run(req).await)
}

#[instrument(skip_all, name = "auth.middleware.enforce")]
pub async fn enforce(
    State(requirement): State<Requirement>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    AccessDecisionPoint::decide(req.extensions().get::<AuthContext>(), &requirement)?;
    Ok(next.run(req).await)
}
