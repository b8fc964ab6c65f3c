//! Middleware for the prompt.rip auth API
//!
//! Request tracing, rate limiting, security headers, and the wallet
//! authentication extractors.

pub mod auth;
mod rate_limiter;
mod security;
mod tracing;

pub use auth::{bearer_token, signed_challenge_from_headers, wallet_address, WalletAuth};
pub use rate_limiter::{rate_limit, RateLimiter};
pub use security::{hsts_header, security_headers};
pub use self::tracing::{request_tracing, REQUEST_ID_HEADER};
