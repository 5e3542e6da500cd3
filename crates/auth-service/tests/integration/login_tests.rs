//! E2E tests for password login.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use auth_service::models::Principal;
use auth_test_utils::*;
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Happy path
// ============================================================================

/// A correct password yields the success envelope with a token for the
/// user's id, and the session record holds the user's permissions.
#[tokio::test]
async fn test_login_valid_credentials_returns_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server.login_response(ALICE_NAME, ALICE_PASSWORD).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["code"], 200);
    assert_eq!(body["msg"], "Login successful");

    let token = body["data"]["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("missing data.token"))?
        .to_string();
    token
        .assert_valid_jwt()
        .assert_for_subject(&ALICE_ID.to_string())
        .assert_issued_by(TEST_ISSUER)
        .assert_expires_in(TEST_TOKEN_TTL_SECONDS);

    let session = server
        .sessions()
        .get(&ALICE_ID.to_string())
        .await?
        .ok_or_else(|| anyhow::anyhow!("session record missing after login"))?;
    assert_eq!(session.username(), ALICE_NAME);
    assert!(session.has_authority(AUTHORITY_USER));
    assert!(session.has_authority(AUTHORITY_USER_VIEW));
    assert_eq!(session.credential_hash(), "");

    Ok(())
}

/// Two logins issue distinct tokens; the jti nonce differs.
#[tokio::test]
async fn test_login_twice_issues_distinct_tokens() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let first = server.login(ALICE_NAME, ALICE_PASSWORD).await?;
    let second = server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    assert_ne!(first, second);

    Ok(())
}

/// The lower-case `username` field is accepted as an alias.
#[tokio::test]
async fn test_login_accepts_username_alias() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/user/login", server.url()))
        .json(&json!({ "username": BOB_NAME, "password": BOB_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn test_login_wrong_password_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server.login_response(ALICE_NAME, "not-the-password").await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "BAD_CREDENTIALS");
    assert!(server.sessions().get(&ALICE_ID.to_string()).await?.is_none());

    Ok(())
}

/// Unknown users get exactly the same answer as a wrong password.
#[tokio::test]
async fn test_login_unknown_user_indistinguishable() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let unknown = server.login_response("mallory", ALICE_PASSWORD).await?;
    let wrong = server.login_response(ALICE_NAME, "nope").await?;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), wrong.status());
    let unknown_body: serde_json::Value = unknown.json().await?;
    let wrong_body: serde_json::Value = wrong.json().await?;
    assert_eq!(unknown_body, wrong_body);

    Ok(())
}

#[tokio::test]
async fn test_login_malformed_body_is_client_error() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/user/login", server.url()))
        .json(&json!({ "userName": ALICE_NAME }))
        .send()
        .await?;

    assert!(response.status().is_client_error());

    Ok(())
}

/// A directory outage is a server error, never a credentials error.
#[tokio::test]
async fn test_login_directory_unavailable_returns_500() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.directory().set_unavailable(true);

    let response = server.login_response(ALICE_NAME, ALICE_PASSWORD).await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "DATABASE_ERROR");

    Ok(())
}
