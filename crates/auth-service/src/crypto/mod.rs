use crate::config::Config;
use crate::errors::AuthError;
use crate::observability::metrics::record_token_validation;
use common::jwt::{check_token_size, extract_alg, validate_iat};
use common::secret::ExposeSecret;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

/// The only algorithm this service issues or accepts.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Valid bcrypt hash of a throwaway password.
///
/// Verified against when the user name is unknown so that a login for a
/// missing user costs the same as one with a wrong password.
pub const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Claims carried by a login token.
///
/// The token holds no authority data. Permissions live in the session record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Random nonce, unique per token.
    pub jti: String,
    /// Stable user identifier.
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// `sub` and `jti` identify a user session and stay out of logs.
impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("jti", &"[REDACTED]")
            .field("sub", &"[REDACTED]")
            .field("iss", &self.iss)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Issues and verifies HS256 login tokens with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    default_ttl: Duration,
    clock_skew: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("default_ttl", &self.default_ttl)
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        default_ttl: Duration,
        clock_skew: Duration,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            default_ttl,
            clock_skew,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret.expose_secret(),
            config.jwt_issuer.clone(),
            config.token_ttl,
            config.jwt_clock_skew,
        )
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject` with a fresh random `jti`.
    ///
    /// `ttl` falls back to the configured default when `None`.
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, AuthError> {
        let jti = Uuid::new_v4().simple().to_string();
        self.issue_with_id(&jti, subject, ttl)
    }

    /// Issue a token with a caller-supplied `jti`.
    #[instrument(skip_all)]
    pub fn issue_with_id(
        &self,
        id: &str,
        subject: &str,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl.is_zero() {
            return Err(AuthError::Crypto(
                "Token lifetime must be greater than zero".to_string(),
            ));
        }

        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| AuthError::Crypto("Token lifetime out of range".to_string()))?;
        let now = chrono::Utc::now().timestamp();
        let exp = now
            .checked_add(ttl_secs)
            .ok_or_else(|| AuthError::Crypto("Token lifetime out of range".to_string()))?;

        let claims = TokenClaims {
            jti: id.to_string(),
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp,
        };

        self.sign(&claims)
    }

    /// Sign already-built claims.
    pub(crate) fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        let mut header = Header::new(TOKEN_ALGORITHM);
        header.typ = Some("JWT".to_string());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Crypto(format!("JWT signing operation failed: {}", e)))
    }

    /// Verify signature, issuer, expiry and `iat` skew, and return the claims.
    ///
    /// Every failure maps to `AuthError::TokenInvalid`; the reason is only
    /// logged at debug level.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        // Size is checked before any base64 or JSON work.
        if let Err(e) = check_token_size(token) {
            record_token_validation("error", Some("oversized"));
            return Err(e.into());
        }

        let alg = extract_alg(token).map_err(|e| {
            record_token_validation("error", Some("malformed"));
            AuthError::from(e)
        })?;
        if alg != "HS256" {
            tracing::debug!(target: "auth.crypto", alg = %alg, "Token rejected: unexpected algorithm");
            record_token_validation("error", Some("algorithm"));
            return Err(AuthError::TokenInvalid(format!("unexpected algorithm {}", alg)));
        }

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                let category = match e.kind() {
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidSignature => "signature",
                    ErrorKind::InvalidIssuer => "issuer",
                    _ => "malformed",
                };
                tracing::debug!(target: "auth.crypto", error = %e, category, "Token verification failed");
                record_token_validation("error", Some(category));
                AuthError::TokenInvalid(category.to_string())
            })?;

        let claims = token_data.claims;

        if let Err(e) = validate_iat(claims.iat, self.clock_skew) {
            record_token_validation("error", Some("clock_skew"));
            return Err(e.into());
        }

        if claims.exp <= claims.iat {
            tracing::debug!(target: "auth.crypto", "Token rejected: exp not after iat");
            record_token_validation("error", Some("malformed"));
            return Err(AuthError::TokenInvalid("exp not after iat".to_string()));
        }

        record_token_validation("success", None);
        Ok(claims)
    }
}

/// Check a login password against a stored bcrypt hash.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AuthError::Crypto(format!("Password verification failed: {}", e)))
}
