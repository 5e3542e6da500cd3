//! Builder patterns for test tokens
//!
//! Produces tokens the service did not issue: expired, foreign-signed,
//! wrong issuer, future `iat`, or `alg: none`.

use crate::test_ids::{TEST_ISSUER, TEST_JWT_SECRET};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

/// Builder for hand-made login tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("1")
///     .expires_in(-60)
///     .build();
/// ```
pub struct TestTokenBuilder {
    jti: String,
    sub: String,
    iss: String,
    iat: i64,
    exp: i64,
    secret: Vec<u8>,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// Valid one-hour token for subject "1", signed with the test secret.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            jti: "test-token-id".to_string(),
            sub: "1".to_string(),
            iss: TEST_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            secret: TEST_JWT_SECRET.to_vec(),
            algorithm: Algorithm::HS256,
        }
    }

    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.iss = issuer.to_string();
        self
    }

    /// Set expiration in seconds from now; negative values are in the past.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set issued-at in seconds from now; positive values are in the future.
    pub fn issued_in(mut self, seconds: i64) -> Self {
        self.iat = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    pub fn signed_with(mut self, secret: &[u8]) -> Self {
        self.secret = secret.to_vec();
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    fn claims(&self) -> serde_json::Value {
        json!({
            "jti": self.jti,
            "sub": self.sub,
            "iss": self.iss,
            "iat": self.iat,
            "exp": self.exp,
        })
    }

    /// Sign the token with the configured HMAC algorithm and secret.
    pub fn build(self) -> String {
        let header = Header::new(self.algorithm);
        encode(&header, &self.claims(), &EncodingKey::from_secret(&self.secret))
            .expect("test token encoding should succeed")
    }

    /// Unsigned token with `alg: none`.
    pub fn build_unsigned(self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.claims().to_string());
        format!("{}.{}.", header, payload)
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
