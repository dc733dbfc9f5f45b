//! The binary entry point for the application.

use std::sync::Arc;
use std::time::Duration;

use app_core::config::Config;
use app_core::jwt::{JwtConfig, JwtService, TokenManager};
use app_core::middleware::request_response_logger;
use app_core::oauth::{SsoProvider, TenantDomain, ZohoProvider};
use app_core::password::{Argon2Hasher, Hasher};
use axum::http::StatusCode;
use axum::{Json, Router, middleware};
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use sea_orm::{ConnectOptions, Database};
use tokio::signal;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(fmt::format::FmtSpan::CLOSE),
        )
        .init();

    if let Err(err) = run().await {
        panic!("❌ Application failed to start: {err}");
    }
}

/// Initializes all dependencies and starts the web server.
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(Config::builder("config/config.yaml").build()?);

    // Initialize the SeaORM database connection pool.
    let mut db_opt = ConnectOptions::new(config.get::<String>("database.url")?);
    db_opt
        .min_connections(config.get("database.min_connections")?)
        .max_connections(config.get("database.max_connections")?)
        .connect_timeout(Duration::from_secs(config.get("database.connect_timeout_secs")?))
        .acquire_timeout(Duration::from_secs(config.get("database.acquire_timeout_secs")?))
        .idle_timeout(Duration::from_secs(config.get("database.idle_timeout_secs")?))
        .max_lifetime(Duration::from_secs(config.get("database.max_lifetime_secs")?))
        .sqlx_logging(config.get("database.sqlx_logging")?)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db_pool = Arc::new(Database::connect(db_opt).await?);

    // Initialize redis connection pool.
    let rds_url = config.get::<String>("redis.url")?;
    let rds_manager = RedisConnectionManager::new(rds_url)?;
    let rds_pool = Pool::builder()
        .max_size(config.get::<u32>("redis.max_connections")?)
        .build(rds_manager)
        .await?;

    // Initialize the Argon2id hasher.
    let hasher: Arc<dyn Hasher> = Arc::new(Argon2Hasher::new());

    // Instantiate the JWT service with all required config values.
    let token_manager: Arc<dyn TokenManager> = Arc::new(JwtService::new(JwtConfig {
        secret: config.get("jwt.secret")?,
        session_exp_secs: config.get("jwt.session_exp_secs")?,
        issuer: config.get("jwt.issuer")?,
        audience: config.get("jwt.audience")?,
    }));

    // Initialize the identity provider. Sign-in stays hidden (404) until a
    // client id is configured.
    let tenant = TenantDomain::parse(&config.get::<String>("zoho.domain").unwrap_or_default());
    let mut provider: Option<Arc<dyn SsoProvider>> = None;
    if let Ok(client_id) = config.get::<String>("zoho.client_id") {
        let client_secret = config.get("zoho.client_secret")?;
        let redirect_uri = format!("{}/?sso=callback", config.get::<String>("server.base_url")?);
        provider = Some(Arc::new(ZohoProvider::new(client_id, client_secret, redirect_uri, tenant)?));
    }

    // Initialize sso module
    let sso_state = sso::new(sso::Dependency {
        db: db_pool.clone(),
        rds: rds_pool,
        config: config.clone(),
        hasher,
        token: token_manager.clone(),
        provider,
    });

    // Create the Router and Middlewares
    let timeout_secs = Duration::from_secs(config.get::<u64>("server.timeout_secs")?);
    let app = Router::new()
        .merge(sso::create_router(sso_state, token_manager.clone()))
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"message": "Endpoint not found"})),
            )
        })
        .method_not_allowed_fallback(|| async {
            (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(serde_json::json!({"message": "Method not allowed"})),
            )
        })
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_response_logger))
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any)) // Enables CORS for all origins
                .layer(RequestDecompressionLayer::new()) // Enables request compression
                .layer(CompressionLayer::new()) // Enables response compression
                .layer(TimeoutLayer::new(timeout_secs)), // Adds a request timeout
        );

    let server_address = config.get::<String>("server.address")?;
    let listener = tokio::net::TcpListener::bind(&server_address).await?;

    tracing::info!("🚀 listening on {}", listener.local_addr()?);

    // Create a broadcast channel to signal shutdown to all application components.
    // Spawn a task to listen for shutdown signals (Ctrl+C and SIGTERM).
    let (shutdown_tx, _) = broadcast::channel(1);
    spawn_shutdown_listener(shutdown_tx.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_tx.subscribe().recv().await.ok();
            tracing::info!("🛑 Server is shutting down gracefully...");
        })
        .await?;

    Ok(())
}

/// Spawns a background task to listen for system shutdown signals.
fn spawn_shutdown_listener(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("🔻 Received SIGINT (Ctrl+C)")},
            _ = terminate => { tracing::info!("🔻 Received SIGTERM")},
        }

        // Send the shutdown signal to all parts of the application.
        if shutdown_tx.send(()).is_err() {
            tracing::error!("Failed to send shutdown signal");
        }
    });
}
