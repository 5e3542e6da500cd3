//! HTTP routes for the auth service.

use crate::auth::Requirement;
use crate::handlers::{self, auth_handler, demo, AppState};
use crate::middleware::{authenticate, enforce, http_metrics_middleware, AuthState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Build the application router.
///
/// | Route | Requirement |
/// |---|---|
/// | `POST /user/login` | anonymous |
/// | `GET /test` | authenticated |
/// | `POST /user/logout` | `user` |
/// | `GET /sayHello` | `user:view` |
/// | `GET /admin` | `admin` |
/// | `GET /health`, `GET /metrics` | outside the auth layers |
///
/// Layer order, outermost first: HTTP metrics, timeout, tracing,
/// `authenticate` (application routes only), per-group `enforce`.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        handshake: state.handshake.clone(),
    });

    let anonymous_routes = Router::new()
        .route("/user/login", post(auth_handler::login))
        .route_layer(middleware::from_fn_with_state(
            Requirement::Anonymous,
            enforce,
        ));

    let authenticated_routes = Router::new()
        .route("/test", get(demo::test))
        .route_layer(middleware::from_fn_with_state(
            Requirement::Authenticated,
            enforce,
        ));

    let user_routes = Router::new()
        .route("/user/logout", post(auth_handler::logout))
        .route_layer(middleware::from_fn_with_state(
            Requirement::authority("user"),
            enforce,
        ));

    let viewer_routes = Router::new()
        .route("/sayHello", get(demo::say_hello))
        .route_layer(middleware::from_fn_with_state(
            Requirement::authority("user:view"),
            enforce,
        ));

    let admin_routes = Router::new()
        .route("/admin", get(demo::admin))
        .route_layer(middleware::from_fn_with_state(
            Requirement::authority("admin"),
            enforce,
        ));

    let app_routes = anonymous_routes
        .merge(authenticated_routes)
        .merge(user_routes)
        .merge(viewer_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(auth_state, authenticate))
        .with_state(state);

    let operational_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .merge(
            Router::new()
                .route("/metrics", get(handlers::metrics_handler))
                .with_state(metrics_handle),
        );

    app_routes
        .merge(operational_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
