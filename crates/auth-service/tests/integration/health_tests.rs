//! Integration tests for the unauthenticated operational endpoints.

use auth_test_utils::TestAuthServer;
use reqwest::{Method, StatusCode};

/// /health answers without a token.
#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server.request(Method::GET, "/health", None).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

/// /health sits outside the auth layers, so even a garbage token is ignored.
#[tokio::test]
async fn test_health_ignores_invalid_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .request(Method::GET, "/health", Some("not-a-token"))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_renders() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server.request(Method::GET, "/metrics", None).await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_404() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server.request(Method::GET, "/nope", None).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
