//! Test server harness for E2E testing
//!
//! Provides `TestAuthServer` for spawning real auth server instances in
//! tests, wired to an in-memory user directory and session store.

use crate::fixtures::InMemoryUserDirectory;
use crate::test_ids::*;
use auth_service::auth::Handshake;
use auth_service::crypto::TokenCodec;
use auth_service::handlers::AppState;
use auth_service::models::{ApiResponse, TokenData};
use auth_service::observability::metrics::init_metrics_recorder;
use auth_service::routes;
use auth_service::services::LoginService;
use auth_service::session::{KeyValueStore, MemoryStore, SessionCache};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Test harness for spawning the auth server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> Result<()> {
///     let server = TestAuthServer::spawn().await?;
///
///     let response = server
///         .client()
///         .post(format!("{}/user/login", server.url()))
///         .json(&json!({"userName": "alice", "password": "wonderland"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    codec: Arc<TokenCodec>,
    sessions: SessionCache,
    directory: Arc<InMemoryUserDirectory>,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Spawn a server seeded with alice, bob and root, sessions in memory.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_store(Arc::new(MemoryStore::new())).await
    }

    /// Spawn a server whose sessions live in `store`.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Sign tokens with `TEST_JWT_SECRET`
    /// - Start the HTTP server in the background
    pub async fn spawn_with_store(store: Arc<dyn KeyValueStore>) -> Result<Self, anyhow::Error> {
        let directory = Arc::new(InMemoryUserDirectory::with_default_users());
        let codec = Arc::new(TokenCodec::new(
            TEST_JWT_SECRET,
            TEST_ISSUER,
            Duration::from_secs(TEST_TOKEN_TTL_SECONDS),
            Duration::from_secs(TEST_CLOCK_SKEW_SECONDS),
        ));
        let sessions = SessionCache::new(store, Some(Duration::from_secs(TEST_TOKEN_TTL_SECONDS)));

        let state = Arc::new(AppState {
            login_service: LoginService::new(directory.clone(), codec.clone(), sessions.clone()),
            handshake: Handshake::new(codec.clone(), sessions.clone()),
        });

        // Installing fails once a recorder exists in this process; fall back
        // to a standalone recorder so each server still renders /metrics.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            codec,
            sessions,
            directory,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Codec sharing the server's secret, for minting tokens directly.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The server's session cache, for inspecting or evicting records.
    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    pub fn directory(&self) -> &InMemoryUserDirectory {
        &self.directory
    }

    /// POST /user/login with the given credentials.
    pub async fn login_response(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<reqwest::Response, anyhow::Error> {
        Ok(self
            .client
            .post(format!("{}/user/login", self.url()))
            .json(&json!({ "userName": user_name, "password": password }))
            .send()
            .await?)
    }

    /// Log in and return the issued token.
    pub async fn login(&self, user_name: &str, password: &str) -> Result<String, anyhow::Error> {
        let response = self.login_response(user_name, password).await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Login for {} failed with {}", user_name, status);
        }

        let body: ApiResponse<TokenData> = response.json().await?;
        body.data
            .map(|d| d.token)
            .ok_or_else(|| anyhow::anyhow!("Login response carried no token"))
    }

    /// Send `method path` with `Authorization: Bearer <token>` when given.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.url(), path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }
}
