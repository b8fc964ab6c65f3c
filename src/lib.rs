//! prompt.rip auth service
//!
//! Wallet-signature authentication for paid game actions: Solana wallets
//! sign a timestamped challenge, the server answers with a session token
//! bound to the wallet, and every later call re-checks that binding.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
};

use crate::config::Environment;
use crate::error::panic_response;
use crate::middleware::RateLimiter;
use crate::state::AppState;

/// Assemble the full application router with its middleware stack
pub fn build_router(state: AppState, rate_limiter: RateLimiter) -> Router {
    routes::api_router()
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            middleware::rate_limit,
        ))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(CatchPanicLayer::custom(panic_response))
}

/// CORS policy from a comma-separated origin list
///
/// Without a list every origin is allowed, except in production where no
/// cross-origin access is granted.
pub fn cors_layer(allowed_origins: Option<&str>, environment: Environment) -> CorsLayer {
    let Some(allowed_origins) = allowed_origins else {
        if environment.is_production() {
            tracing::warn!("CORS_ALLOWED_ORIGINS not set in production, denying cross-origin requests");
            return CorsLayer::new();
        }
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AnyOrigin)
}
