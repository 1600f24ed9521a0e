//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.
//!
//! `api seed` inserts the built-in roles and the admin account, then exits.

mod config;
mod recovery;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use auth::{AuthConfig, auth_router, member_router};
use axum::middleware::from_fn;
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::db::{ConnectOptions, connect_with_retry};
use platform::repository::PgDatabase;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::recovery::recover_panic;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_LOG_FILTER: &str = "api=info,auth=info,todo=info,platform=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env.local wins over .env; neither is required
    if dotenvy::from_filename(".env.local").is_err() {
        dotenvy::dotenv().ok();
    }

    let config = AppConfig::from_env()?;
    init_tracing(&config);

    let pool = connect_with_retry(
        &config.database_url,
        &ConnectOptions {
            attempts: config.connect_attempts,
            delay: config.connect_delay,
            ..ConnectOptions::default()
        },
    )
    .await
    .context("Failed to connect to database")?;

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let db = PgDatabase::new(pool);

    if std::env::args().nth(1).as_deref() == Some("seed") {
        let report = auth::infra::seed(&db, config.seed_admin_password.as_deref()).await?;
        tracing::info!(?report, "Seeding finished");
        return Ok(());
    }

    let auth_config = Arc::new(AuthConfig::new(config.jwt_secret.as_bytes()));

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    let api = Router::new()
        .merge(auth_router(db.clone(), auth_config.clone()))
        .merge(member_router(db.clone(), auth_config.clone()))
        .nest("/todo", todo::todo_router(db, auth_config));

    // Layers run outermost-last: CORS, then trace, then panic recovery
    let app = Router::new()
        .nest("/api", api)
        .layer(from_fn(recover_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.environment.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
