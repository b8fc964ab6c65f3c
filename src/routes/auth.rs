//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::token_panic_response;
use crate::handlers::auth;
use crate::state::AppState;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/verify-token",
            get(auth::verify_token).layer(CatchPanicLayer::custom(token_panic_response)),
        )
        .route("/create-token", post(auth::create_token))
        .route("/authenticate", post(auth::authenticate))
}
