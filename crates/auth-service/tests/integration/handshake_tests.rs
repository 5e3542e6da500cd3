//! E2E tests for the per-request token handshake.
//!
//! Every request under the auth layers goes through: token extraction,
//! signature and claim verification, then the session lookup.

use async_trait::async_trait;
use auth_service::errors::AuthError;
use auth_service::session::KeyValueStore;
use auth_test_utils::*;
use jsonwebtoken::Algorithm;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;

async fn error_code(response: reqwest::Response) -> Result<String, anyhow::Error> {
    let body: serde_json::Value = response.json().await?;
    Ok(body["error"].as_str().unwrap_or_default().to_string())
}

// ============================================================================
// Token transport
// ============================================================================

#[tokio::test]
async fn test_bearer_token_authenticates() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    let response = server.request(Method::GET, "/test", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "HelloWorld");

    Ok(())
}

/// Older clients send the raw token in a `token` header.
#[tokio::test]
async fn test_legacy_token_header_authenticates() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    let response = server
        .client()
        .get(format!("{}/test", server.url()))
        .header("token", &token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

/// The Bearer scheme name is case-insensitive.
#[tokio::test]
async fn test_lowercase_bearer_scheme_authenticates() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    let response = server
        .client()
        .get(format!("{}/test", server.url()))
        .header("Authorization", format!("bearer {}", token))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

/// A credential under another scheme is refused, not treated as anonymous,
/// and the legacy header is not consulted.
#[tokio::test]
async fn test_foreign_authorization_scheme_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    let response = server
        .client()
        .post(format!("{}/user/login", server.url()))
        .header("Authorization", "Token garbage")
        .header("token", &token)
        .json(&serde_json::json!({ "userName": ALICE_NAME, "password": ALICE_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await?, "TOKEN_INVALID");

    Ok(())
}

// ============================================================================
// Token rejection
// ============================================================================

#[tokio::test]
async fn test_expired_token_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.login(ALICE_NAME, ALICE_PASSWORD).await?;
    let token = TestTokenBuilder::new()
        .for_subject(&ALICE_ID.to_string())
        .issued_in(-7200)
        .expires_in(-60)
        .build();

    let response = server.request(Method::GET, "/test", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await?, "TOKEN_INVALID");

    Ok(())
}

/// A token signed with another secret fails even when a session exists.
#[tokio::test]
async fn test_foreign_signature_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.login(ALICE_NAME, ALICE_PASSWORD).await?;
    let token = TestTokenBuilder::new()
        .for_subject(&ALICE_ID.to_string())
        .signed_with(FOREIGN_JWT_SECRET)
        .build();

    let response = server.request(Method::GET, "/test", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await?, "TOKEN_INVALID");

    Ok(())
}

#[tokio::test]
async fn test_other_algorithms_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    let tokens = [
        TestTokenBuilder::new()
            .for_subject(&ALICE_ID.to_string())
            .build_unsigned(),
        TestTokenBuilder::new()
            .for_subject(&ALICE_ID.to_string())
            .with_algorithm(Algorithm::HS512)
            .build(),
    ];

    for token in tokens {
        let response = server.request(Method::GET, "/test", Some(&token)).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    Ok(())
}

#[tokio::test]
async fn test_wrong_issuer_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.login(ALICE_NAME, ALICE_PASSWORD).await?;
    let token = TestTokenBuilder::new()
        .for_subject(&ALICE_ID.to_string())
        .with_issuer("someone-else")
        .build();

    let response = server.request(Method::GET, "/test", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// `iat` further in the future than the allowed skew is rejected.
#[tokio::test]
async fn test_future_issued_at_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.login(ALICE_NAME, ALICE_PASSWORD).await?;
    let token = TestTokenBuilder::new()
        .for_subject(&ALICE_ID.to_string())
        .issued_in(TEST_CLOCK_SKEW_SECONDS as i64 + 600)
        .expires_in(7200)
        .build();

    let response = server.request(Method::GET, "/test", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// A bad token is refused before the route's own requirement is consulted,
/// so it fails even on the anonymous login route.
#[tokio::test]
async fn test_invalid_token_rejected_on_anonymous_route() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/user/login", server.url()))
        .bearer_auth("garbage")
        .json(&serde_json::json!({ "userName": ALICE_NAME, "password": ALICE_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await?, "TOKEN_INVALID");

    Ok(())
}

// ============================================================================
// Session lookup
// ============================================================================

/// A well-formed token whose subject has no session record is refused.
#[tokio::test]
async fn test_valid_token_without_session_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.codec().issue(&BOB_ID.to_string(), None)?;

    let response = server.request(Method::GET, "/test", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await?, "SESSION_EXPIRED");

    Ok(())
}

/// Evicting the session record revokes a token that is still in date.
#[tokio::test]
async fn test_evicted_session_revokes_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;
    server.sessions().delete(&ALICE_ID.to_string()).await?;

    let response = server.request(Method::GET, "/test", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await?, "SESSION_EXPIRED");

    Ok(())
}

struct DownStore;

#[async_trait]
impl KeyValueStore for DownStore {
    async fn put(&self, _: &str, _: &str, _: Option<Duration>) -> Result<(), AuthError> {
        Err(AuthError::SessionStore("connection refused".to_string()))
    }

    async fn get(&self, _: &str) -> Result<Option<String>, AuthError> {
        Err(AuthError::SessionStore("connection refused".to_string()))
    }

    async fn delete(&self, _: &str) -> Result<bool, AuthError> {
        Err(AuthError::SessionStore("connection refused".to_string()))
    }
}

/// A store outage is reported as 503, never as a session miss.
#[tokio::test]
async fn test_session_store_outage_returns_503() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn_with_store(Arc::new(DownStore)).await?;
    let token = server.codec().issue(&ALICE_ID.to_string(), None)?;

    let response = server.request(Method::GET, "/test", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(response).await?, "SESSION_STORE_UNAVAILABLE");

    let login = server.login_response(ALICE_NAME, ALICE_PASSWORD).await?;
    assert_eq!(login.status(), StatusCode::SERVICE_UNAVAILABLE);

    Ok(())
}
