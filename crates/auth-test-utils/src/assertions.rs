//! Custom test assertions for expressive tests
//!
//! Decodes token segments without verifying the signature so tests can
//! check shape and claims directly.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    #[serde(default)]
    pub typ: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub jti: String,
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {}", index));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e))
}

fn header(token: &str) -> JwtHeader {
    serde_json::from_slice(&segment(token, 0))
        .unwrap_or_else(|e| panic!("Failed to parse JWT header JSON: {}", e))
}

fn claims(token: &str) -> JwtClaims {
    serde_json::from_slice(&segment(token, 1))
        .unwrap_or_else(|e| panic!("Failed to parse JWT claims JSON: {}", e))
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject("1")
///     .assert_expires_in(3600);
/// ```
pub trait TokenAssertions {
    /// Assert the token is a three-part HS256 JWT with a nonce.
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert the token carries the specified issuer
    fn assert_issued_by(&self, issuer: &str) -> &Self;

    /// Assert the token expires within the specified seconds
    fn assert_expires_in(&self, seconds: u64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header = header(self);
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ.as_deref(), Some("JWT"), "Expected JWT type");

        let claims = claims(self);
        assert!(!claims.jti.is_empty(), "Token must carry a jti nonce");
        assert!(
            claims.exp > claims.iat,
            "exp ({}) must be after iat ({})",
            claims.exp,
            claims.iat
        );
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.sub, subject, "Unexpected token subject");
        self
    }

    fn assert_issued_by(&self, issuer: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.iss, issuer, "Unexpected token issuer");
        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims = claims(self);
        let now = Utc::now().timestamp();
        let remaining = claims.exp - now;
        assert!(remaining > 0, "Token already expired ({}s ago)", -remaining);
        assert!(
            remaining <= seconds as i64,
            "Token expires in {}s, expected at most {}s",
            remaining,
            seconds
        );
        self
    }
}
