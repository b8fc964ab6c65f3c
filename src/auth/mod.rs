//! Authentication module for prompt.rip
//!
//! Provides wallet-based authentication using Solana addresses.
//! - Ed25519 verification of timestamped challenge messages
//! - Stateless JWT session tokens bound to a wallet address
//! - Token-to-wallet binding checks on every authenticated call

mod challenge;
mod crypto;
mod jwt;
mod service;

pub use challenge::{AuthChallenge, SignedChallenge, CHALLENGE_PREFIX};
pub use crypto::{decode_public_key, verify_wallet_signature, CryptoError};
pub use jwt::{generate_session_token, verify_session_token, Claims, JwtError};
pub use service::{
    AuthConfig, AuthService, DEFAULT_CHALLENGE_WINDOW_SECS, DEFAULT_TOKEN_TTL_HOURS,
    MIN_SECRET_LENGTH,
};

pub use crate::error::AuthError;
