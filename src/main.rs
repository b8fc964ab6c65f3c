//! prompt.rip auth server
//!
//! Issues and verifies wallet-bound session tokens for the game frontend.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use promptrip_auth::{
    auth::AuthService, build_router, config::Config, cors_layer, middleware, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing or weak JWT_SECRET stops the server here
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let auth_service = Arc::new(AuthService::new(config.auth_config()));

    tracing::info!(
        environment = config.environment.as_str(),
        token_ttl_hours = auth_service.token_ttl().num_hours(),
        challenge_window_secs = config.auth.challenge_window.num_seconds(),
        "Configuration loaded"
    );

    let app_state = AppState::new(auth_service);

    let rate_limiter = middleware::RateLimiter::new(config.rate_limit_rps);
    tokio::spawn(rate_limiter.clone().run_pruner(Duration::from_secs(300)));

    let mut app = build_router(app_state, rate_limiter).layer(cors_layer(
        config.cors_allowed_origins.as_deref(),
        config.environment,
    ));
    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_header));
    }

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
