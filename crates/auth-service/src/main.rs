use auth_service::auth::Handshake;
use auth_service::config::{Config, LogFormat, SessionBackend};
use auth_service::crypto::TokenCodec;
use auth_service::handlers::AppState;
use auth_service::observability::metrics::init_metrics_recorder;
use auth_service::repositories::PgUserDirectory;
use auth_service::routes;
use auth_service::services::LoginService;
use auth_service::session::{KeyValueStore, MemoryStore, RedisStore, SessionCache};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "auth=debug,common=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    init_tracing(config.log_format);

    info!("Starting auth service");
    info!(config = ?config, "Configuration loaded");

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    info!("Connecting to database...");
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;
    info!("Database connection established");

    let store: Arc<dyn KeyValueStore> = match config.session_backend {
        SessionBackend::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .ok_or("REDIS_URL is required for the redis session backend")?;
            info!("Connecting to Redis...");
            Arc::new(RedisStore::connect(redis_url).await?)
        }
        SessionBackend::Memory => {
            warn!("Using in-memory session store; sessions are lost on restart and not shared");
            Arc::new(MemoryStore::new())
        }
    };

    let codec = Arc::new(TokenCodec::from_config(&config));
    let sessions = SessionCache::new(store, config.session_ttl);
    info!(
        issuer = codec.issuer(),
        token_ttl_secs = codec.default_ttl().as_secs(),
        session_ttl_secs = ?sessions.ttl().map(|ttl| ttl.as_secs()),
        "Token codec and session cache ready"
    );
    let directory = Arc::new(PgUserDirectory::new(db_pool));

    let state = Arc::new(AppState {
        login_service: LoginService::new(directory, codec.clone(), sessions.clone()),
        handshake: Handshake::new(codec, sessions),
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Auth service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auth service shutdown complete");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, shutting down"),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
