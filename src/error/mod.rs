//! Centralized error handling for the auth API
//!
//! Every expected failure maps to a 401 with a JSON body carrying a
//! human-readable `error` field and a stable `code`. Only unexpected faults
//! become a 500, and their details are logged instead of returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

use crate::auth::{CryptoError, JwtError};

/// Authentication and authorization failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing authentication headers")]
    MissingCredential,

    #[error("Invalid timestamp")]
    InvalidTimestamp,

    #[error("Message expired")]
    ChallengeExpired,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid signature format")]
    InvalidSignature,

    #[error("Invalid signature")]
    SignatureMismatch,

    #[error("Token creation failed")]
    TokenCreation,

    #[error("No token provided")]
    TokenMissing,

    #[error("No wallet address provided")]
    AddressMissing,

    #[error("jwt expired")]
    TokenExpired,

    /// Carries the decoder's reason, e.g. "invalid signature"
    #[error("{0}")]
    TokenMalformed(String),

    #[error("Token belongs to different wallet")]
    TokenWalletMismatch {
        token_wallet: String,
        current_wallet: String,
    },

    #[error("Internal server error")]
    ServerFault(String),
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Only set by the token verification endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_wallet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_wallet: Option<String>,
}

impl AuthError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "MISSING_CREDENTIAL",
            AuthError::InvalidTimestamp
            | AuthError::InvalidPublicKey
            | AuthError::InvalidSignature => "INVALID_CREDENTIAL",
            AuthError::ChallengeExpired => "CHALLENGE_EXPIRED",
            AuthError::SignatureMismatch => "SIGNATURE_MISMATCH",
            AuthError::TokenCreation => "TOKEN_CREATION_FAILED",
            AuthError::TokenMissing => "TOKEN_MISSING",
            AuthError::AddressMissing => "ADDRESS_MISSING",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenMalformed(_) => "TOKEN_MALFORMED",
            AuthError::TokenWalletMismatch { .. } => "TOKEN_WALLET_MISMATCH",
            AuthError::ServerFault(_) => "SERVER_FAULT",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ServerFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Build the response body
    pub fn body(&self) -> ErrorResponse {
        let (token_wallet, current_wallet) = match self {
            AuthError::TokenWalletMismatch {
                token_wallet,
                current_wallet,
            } => (Some(token_wallet.clone()), Some(current_wallet.clone())),
            _ => (None, None),
        };

        ErrorResponse {
            valid: None,
            error: self.to_string(),
            code: self.error_code().to_string(),
            token_wallet,
            current_wallet,
        }
    }

    fn log(&self) {
        match self {
            AuthError::ServerFault(detail) => {
                tracing::error!(error = %detail, code = %self.error_code(), "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %self, code = %self.error_code(), "Authentication rejected");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Rejection for the token verification endpoint
///
/// Same mapping as [`AuthError`] but the body also carries `valid: false`.
#[derive(Debug)]
pub struct TokenRejection(pub AuthError);

impl From<AuthError> for TokenRejection {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for TokenRejection {
    fn into_response(self) -> Response {
        self.0.log();

        let mut body = self.0.body();
        body.valid = Some(false);
        if matches!(self.0, AuthError::ServerFault(_)) {
            body.error = "Server error during token verification".to_string();
        }

        (self.0.status_code(), Json(body)).into_response()
    }
}

impl From<CryptoError> for AuthError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidPublicKey(_) => AuthError::InvalidPublicKey,
            CryptoError::InvalidSignature(_) => AuthError::InvalidSignature,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::EncodingFailed(_) => AuthError::TokenCreation,
            other => AuthError::TokenMalformed(other.to_string()),
        }
    }
}

fn panic_detail(panic: Box<dyn Any + Send + 'static>) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}

/// Render a caught panic as a [`AuthError::ServerFault`]
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    AuthError::ServerFault(panic_detail(panic)).into_response()
}

/// Render a caught panic in the token verification shape
pub fn token_panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    TokenRejection(AuthError::ServerFault(panic_detail(panic))).into_response()
}

/// Result type alias using AuthError
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::MissingCredential.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::ServerFault("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_match_wire_contract() {
        assert_eq!(
            AuthError::MissingCredential.to_string(),
            "Missing authentication headers"
        );
        assert_eq!(AuthError::ChallengeExpired.to_string(), "Message expired");
        assert_eq!(AuthError::InvalidPublicKey.to_string(), "Invalid public key");
        assert_eq!(AuthError::SignatureMismatch.to_string(), "Invalid signature");
        assert_eq!(AuthError::TokenMissing.to_string(), "No token provided");
        assert_eq!(
            AuthError::AddressMissing.to_string(),
            "No wallet address provided"
        );
    }

    #[test]
    fn test_mismatch_body_carries_both_wallets() {
        let body = AuthError::TokenWalletMismatch {
            token_wallet: "A".to_string(),
            current_wallet: "B".to_string(),
        }
        .body();

        assert_eq!(body.error, "Token belongs to different wallet");
        assert_eq!(body.token_wallet.as_deref(), Some("A"));
        assert_eq!(body.current_wallet.as_deref(), Some("B"));
    }

    #[test]
    fn test_server_fault_hides_detail() {
        let body = AuthError::ServerFault("db password leaked".to_string()).body();
        assert!(!body.error.contains("password"));
    }

    async fn render(response: Response) -> (StatusCode, ErrorResponse) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_panic_response_hides_detail() {
        let (status, body) = render(panic_response(Box::new("secret detail"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "SERVER_FAULT");
        assert_eq!(body.valid, None);
        assert!(!body.error.contains("secret"));
    }

    #[tokio::test]
    async fn test_token_panic_response_matches_rejection_shape() {
        let (status, body) = render(token_panic_response(Box::new("boom".to_string()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.valid, Some(false));
        assert_eq!(body.error, "Server error during token verification");
        assert_eq!(body.code, "SERVER_FAULT");
    }

    #[test]
    fn test_jwt_error_conversion() {
        assert_eq!(AuthError::from(JwtError::Expired), AuthError::TokenExpired);
        assert_eq!(
            AuthError::from(JwtError::InvalidSignature),
            AuthError::TokenMalformed("invalid signature".to_string())
        );
    }
}
