//! Client side of the wallet authentication protocol
//!
//! [`AuthGate`] decides, per paid action, whether a cached session token can
//! be reused or the wallet has to sign a fresh challenge. Wallet access and
//! the server are behind the [`WalletSigner`] and [`AuthBackend`] traits so
//! the gate runs the same against a browser wallet, a keypair, or a fake.

mod cache;
mod gate;
mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::SignedChallenge;
use crate::error::ErrorResponse;

pub use cache::{ClientAuthCache, MemoryTokenStore, TokenStore};
pub use gate::{AuthGate, AuthorizedRequest, GateState, TokenSource};
pub use http::HttpAuthBackend;

/// Client-side authentication failures
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Wallet changed during authentication")]
    WalletChanged,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Rejected by server ({status}): {}", .body.error)]
    Rejected { status: u16, body: ErrorResponse },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl GateError {
    /// The server's rejection body, if this is a rejection
    pub fn rejection(&self) -> Option<&ErrorResponse> {
        match self {
            GateError::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        GateError::Transport(err.to_string())
    }
}

/// Access to the user's wallet
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Active wallet address, `None` when disconnected
    fn address(&self) -> Option<String>;

    /// Produce a detached ed25519 signature over `message`
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, GateError>;
}

/// The auth endpoints, as seen by the client
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `GET /verify-token`; `Ok` only when the token is valid for `address`
    async fn verify_token(&self, token: &str, address: &str) -> Result<(), GateError>;

    /// `POST /create-token`; returns the issued session token
    async fn create_token(&self, challenge: &SignedChallenge) -> Result<String, GateError>;
}
