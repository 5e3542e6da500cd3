use crate::auth::{CurrentIdentity, Handshake};
use crate::errors::AuthError;
use crate::models::{ApiResponse, LoginRequest, TokenData};
use crate::services::login_service::LoginService;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub login_service: LoginService,
    pub handshake: Handshake,
}

/// POST /user/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenData>>, AuthError> {
    let token = state
        .login_service
        .login(&payload.user_name, &payload.password)
        .await?;

    Ok(Json(ApiResponse::ok("Login successful", TokenData { token })))
}

/// POST /user/logout
///
/// Deletes the caller's session record. The token itself stays valid
/// cryptographically but no longer passes the handshake.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(ctx): CurrentIdentity,
) -> Result<Json<ApiResponse<()>>, AuthError> {
    state.login_service.logout(ctx.subject()).await?;

    Ok(Json(ApiResponse::ok_empty("Logout successful")))
}
