//! Authentication HTTP handlers
//!
//! Endpoints for wallet-signature authentication and token verification.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::auth::{AuthService, SignedChallenge};
use crate::error::{AuthError, TokenRejection};
use crate::middleware::{bearer_token, wallet_address, WalletAuth};
use crate::models::{TokenResponse, TokenValidResponse};

/// GET /verify-token - Check a cached token against the caller's wallet
pub async fn verify_token(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<TokenValidResponse>, TokenRejection> {
    let token = bearer_token(&headers);
    let address = wallet_address(&headers);

    let wallet_address = auth_service.validate_token(token.as_deref(), address.as_deref())?;

    Ok(Json(TokenValidResponse {
        valid: true,
        wallet_address,
    }))
}

/// POST /create-token - Verify a signed challenge and issue a session token
pub async fn create_token(
    State(auth_service): State<Arc<AuthService>>,
    challenge: SignedChallenge,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = auth_service.create_token(&challenge)?;
    Ok(Json(TokenResponse { token }))
}

/// POST /authenticate - Token or signature, whichever the caller brings
pub async fn authenticate(auth: WalletAuth) -> Json<TokenResponse> {
    tracing::debug!(wallet = %auth.wallet_address, "Wallet authenticated");
    Json(TokenResponse { token: auth.token })
}
