use crate::observability::ErrorCategory;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::jwt::JwtValidationError;
use serde::Serialize;
use thiserror::Error;

/// Generic message for every token rejection; the reason goes to debug logs.
pub const TOKEN_INVALID_MESSAGE: &str = "The access token is invalid or expired";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong user name or password at login.
    #[error("Bad credentials")]
    BadCredentials,

    /// Malformed, badly signed, or expired token.
    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    /// Token verified but no session record backs it (logged out or evicted).
    #[error("Session expired or missing")]
    SessionExpiredOrMissing,

    /// No identity on a request that needs one.
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Permission denied: requires {required}")]
    PermissionDenied { required: String },

    /// Session cache unreachable or returned unreadable data.
    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

impl From<JwtValidationError> for AuthError {
    fn from(err: JwtValidationError) -> Self {
        AuthError::TokenInvalid(err.to_string())
    }
}

impl AuthError {
    /// HTTP status used at the boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::BadCredentials
            | AuthError::TokenInvalid(_)
            | AuthError::SessionExpiredOrMissing
            | AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            AuthError::SessionStore(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Database(_) | AuthError::Crypto(_) | AuthError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::BadCredentials => "BAD_CREDENTIALS",
            AuthError::TokenInvalid(_) => "TOKEN_INVALID",
            AuthError::SessionExpiredOrMissing => "SESSION_EXPIRED",
            AuthError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            AuthError::PermissionDenied { .. } => "PERMISSION_DENIED",
            AuthError::SessionStore(_) => "SESSION_STORE_UNAVAILABLE",
            AuthError::Database(_) => "DATABASE_ERROR",
            AuthError::Crypto(_) => "CRYPTO_ERROR",
            AuthError::Internal => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AuthError::BadCredentials => "Incorrect user name or password".to_string(),
            AuthError::TokenInvalid(_) => TOKEN_INVALID_MESSAGE.to_string(),
            AuthError::SessionExpiredOrMissing => {
                "Session expired or not logged in, please log in again".to_string()
            }
            AuthError::AuthenticationRequired => {
                "Authentication failed, please log in again".to_string()
            }
            AuthError::PermissionDenied { required } => {
                format!("Insufficient permissions: requires {}", required)
            }
            AuthError::SessionStore(_) => "Session store is unavailable".to_string(),
            AuthError::Database(_) => "An internal database error occurred".to_string(),
            AuthError::Crypto(_) => "An internal cryptographic error occurred".to_string(),
            AuthError::Internal => "An internal error occurred".to_string(),
        }
    }
}

/// Uniform error envelope, shaped like the success envelope (`code`, `msg`).
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    msg: String,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_authority: Option<String>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = ErrorCategory::from(&self).as_str();

        match &self {
            AuthError::SessionStore(detail)
            | AuthError::Database(detail)
            | AuthError::Crypto(detail) => {
                tracing::error!(target: "auth.errors", category, code = self.code(), detail = %detail, "Request failed");
            }
            AuthError::Internal => {
                tracing::error!(target: "auth.errors", category, code = self.code(), "Request failed");
            }
            _ => {
                tracing::debug!(target: "auth.errors", category, code = self.code(), "Request rejected");
            }
        }

        let required_authority = match &self {
            AuthError::PermissionDenied { required } => Some(required.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            msg: self.public_message(),
            error: self.code(),
            required_authority,
        };

        (status, Json(body)).into_response()
    }
}
