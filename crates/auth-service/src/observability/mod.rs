//! Observability for the auth service.
//!
//! Instrumented functions use `#[instrument(skip_all)]` and name their fields
//! explicitly. Field handling:
//! - plain: enums, outcomes, error categories
//! - hashed with [`hash_for_correlation`]: user subjects and user names
//! - never logged: passwords, tokens, the signing key, credential hashes

pub mod metrics;

use crate::errors::AuthError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// One-way and truncated. Good enough to follow one user across log lines,
/// not a substitute for hashing secrets.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Bounded error categories used as metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Authorization,
    Infrastructure,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::Infrastructure => "infrastructure",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&AuthError> for ErrorCategory {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::BadCredentials
            | AuthError::TokenInvalid(_)
            | AuthError::SessionExpiredOrMissing
            | AuthError::AuthenticationRequired => ErrorCategory::Authentication,
            AuthError::PermissionDenied { .. } => ErrorCategory::Authorization,
            AuthError::SessionStore(_) | AuthError::Database(_) => ErrorCategory::Infrastructure,
            AuthError::Crypto(_) | AuthError::Internal => ErrorCategory::Internal,
        }
    }
}
