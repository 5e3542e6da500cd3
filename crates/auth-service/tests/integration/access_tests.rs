//! E2E tests for per-route access requirements.

use auth_test_utils::*;
use reqwest::{Method, StatusCode};

#[tokio::test]
async fn test_required_authority_present_allows() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    let response = server
        .request(Method::GET, "/sayHello", Some(&token))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "Hello, World!");

    Ok(())
}

#[tokio::test]
async fn test_missing_authority_is_forbidden() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ALICE_NAME, ALICE_PASSWORD).await?;

    let response = server.request(Method::GET, "/admin", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "PERMISSION_DENIED");
    assert_eq!(body["required_authority"], AUTHORITY_ADMIN);

    Ok(())
}

#[tokio::test]
async fn test_viewer_route_denied_without_view_permission() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(BOB_NAME, BOB_PASSWORD).await?;

    let response = server
        .request(Method::GET, "/sayHello", Some(&token))
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_admin_reaches_admin_page() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(ROOT_NAME, ROOT_PASSWORD).await?;

    let response = server.request(Method::GET, "/admin", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "Admin Page");

    Ok(())
}

/// No token on a protected route reaches the decision point as anonymous.
#[tokio::test]
async fn test_anonymous_on_protected_routes_is_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    for path in ["/sayHello", "/admin", "/test"] {
        let response = server.request(Method::GET, path, None).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"], "AUTHENTICATION_REQUIRED", "{}", path);
    }

    Ok(())
}

/// Authority changes apply at the next login, not to existing sessions.
#[tokio::test]
async fn test_permissions_fixed_at_login() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(BOB_NAME, BOB_PASSWORD).await?;
    server.directory().add_user(
        BOB_ID,
        BOB_NAME,
        BOB_PASSWORD,
        &[AUTHORITY_USER, AUTHORITY_USER_VIEW],
    );

    let before = server
        .request(Method::GET, "/sayHello", Some(&token))
        .await?;
    assert_eq!(before.status(), StatusCode::FORBIDDEN);

    let token = server.login(BOB_NAME, BOB_PASSWORD).await?;
    let after = server
        .request(Method::GET, "/sayHello", Some(&token))
        .await?;
    assert_eq!(after.status(), StatusCode::OK);

    Ok(())
}

/// Logout is gated on the plain `user` authority.
#[tokio::test]
async fn test_user_authority_allows_logout() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = server.login(BOB_NAME, BOB_PASSWORD).await?;

    let response = server
        .request(Method::POST, "/user/logout", Some(&token))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

/// Holding `user:view` does not imply `user`: matching is exact.
#[tokio::test]
async fn test_logout_without_user_authority_is_forbidden() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .directory()
        .add_user(4, "carol", "viewer-only", &[AUTHORITY_USER_VIEW]);
    let token = server.login("carol", "viewer-only").await?;

    let hello = server
        .request(Method::GET, "/sayHello", Some(&token))
        .await?;
    assert_eq!(hello.status(), StatusCode::OK);

    let response = server
        .request(Method::POST, "/user/logout", Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["required_authority"], AUTHORITY_USER);

    Ok(())
}
