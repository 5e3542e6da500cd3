use crate::errors::AuthError;
use crate::models::{Identity, Principal};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Identity published for the rest of one request.
///
/// Inserted into request extensions by the authentication middleware and
/// never modified afterwards.
#[derive(Debug, Clone)]
pub struct AuthContext {
    identity: Arc<Identity>,
}

impl AuthContext {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Arc::new(identity),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn subject(&self) -> &str {
        self.identity.subject()
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.identity.has_authority(authority)
    }
}

/// Extractor for handlers that need the authenticated identity.
///
/// Rejects with `AuthenticationRequired` when the request is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or(AuthError::AuthenticationRequired)
    }
}
