//! Route definitions for the prompt.rip auth API

mod auth;

use axum::{routing::get, Router};

pub use auth::auth_routes;

use crate::handlers::health_check;
use crate::state::AppState;

/// Public API: auth routes at the root and under `/api/auth`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes())
        .nest("/api/auth", auth_routes())
}
