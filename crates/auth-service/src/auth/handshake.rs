use super::context::AuthContext;
use crate::crypto::TokenCodec;
use crate::errors::AuthError;
use crate::observability::hash_for_correlation;
use crate::session::SessionCache;
use std::sync::Arc;
use tracing::instrument;

/// Result of a successful handshake.
#[derive(Debug, Clone)]
pub enum HandshakeOutcome {
    /// No token was presented. Not an error; routes decide whether that is enough.
    Anonymous,
    Authenticated(AuthContext),
}

/// Per-request authentication: verify the token, then load its session.
#[derive(Clone)]
pub struct Handshake {
    codec: Arc<TokenCodec>,
    sessions: SessionCache,
}

impl Handshake {
    pub fn new(codec: Arc<TokenCodec>, sessions: SessionCache) -> Self {
        Self { codec, sessions }
    }

    /// Run the handshake for an optional token.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` - the token fails verification
    /// - `SessionExpiredOrMissing` - the token is valid but no session backs it
    /// - `SessionStore` - the session store could not be read
    #[instrument(skip_all, name = "auth.handshake")]
    pub async fn run(&self, token: Option<&str>) -> Result<HandshakeOutcome, AuthError> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(HandshakeOutcome::Anonymous);
        };

        let claims = self.codec.verify(token)?;

        let Some(identity) = self.sessions.get(&claims.sub).await? else {
            tracing::debug!(
                target: "auth.handshake",
                subject = %hash_for_correlation(&claims.sub),
                "Valid token without a session record"
            );
            return Err(AuthError::SessionExpiredOrMissing);
        };

        tracing::debug!(
            target: "auth.handshake",
            subject = %hash_for_correlation(&claims.sub),
            "Request authenticated"
        );

        Ok(HandshakeOutcome::Authenticated(AuthContext::new(identity)))
    }
}
