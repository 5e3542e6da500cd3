//! E2E tests for logout.

use auth_test_utils::*;
use reqwest::{Method, StatusCode};

#[tokio::test]
async fn test_logout_revokes_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    let response = server
        .request(Method::POST, "/user/logout", Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["code"], 200);
    assert_eq!(body["msg"], "Logout successful");
    assert!(body.get("data").is_none());

    let after = server.request(Method::GET, "/test", Some(&token)).await?;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = after.json().await?;
    assert_eq!(body["error"], "SESSION_EXPIRED");

    Ok(())
}

/// The second logout carries a token whose session is already gone, so the
/// handshake refuses it; the session stays deleted either way.
#[tokio::test]
async fn test_logout_twice_second_is_session_expired() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    let first = server
        .request(Method::POST, "/user/logout", Some(&token))
        .await?;
    let second = server
        .request(Method::POST, "/user/logout", Some(&token))
        .await?;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    assert!(server.sessions().get(&ALICE_ID.to_string()).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_logout_without_token_is_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server.request(Method::POST, "/user/logout", None).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// Sessions are keyed by user, so logging in again after logout works and
/// the fresh token is accepted.
#[tokio::test]
async fn test_login_after_logout_works() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;
    server
        .request(Method::POST, "/user/logout", Some(&token))
        .await?;

    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;
    let response = server.request(Method::GET, "/test", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
