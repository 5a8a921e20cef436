//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, routes::cors_layer, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let db = Arc::new(db);

    // Redis is optional; without it rate limiting is disabled.
    let cache = match config.redis_url.as_deref() {
        Some(url) => match Cache::try_connect(url).await {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                tracing::warn!("Redis unavailable, rate limiting disabled: {}", e);
                None
            }
        },
        None => {
            tracing::info!("REDIS_URL not set, rate limiting disabled");
            None
        }
    };

    let host = args.host.unwrap_or_else(|| config.server_host.clone());
    let port = args.port.unwrap_or(config.server_port);
    let cors = cors_layer(&config.cors_allowed_origins);

    let app_state = AppState::from_config(db, cache, config);
    let app = create_router(app_state).layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    // Connection info feeds the per-client rate limit key
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
