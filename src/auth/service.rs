//! Authentication service
//!
//! Core logic for wallet-signature authentication: challenge freshness,
//! signature verification, token issuance and token-to-wallet binding.
//! The service is stateless apart from the signing keys.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::config::ConfigError;
use crate::error::{AuthError, AuthResult};

use super::challenge::{AuthChallenge, SignedChallenge};
use super::crypto::verify_wallet_signature;
use super::jwt::{generate_session_token, verify_session_token, Claims};

/// Minimum accepted length of the token signing secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Default session token lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;

/// Default freshness window for signed challenges
pub const DEFAULT_CHALLENGE_WINDOW_SECS: i64 = 300;

/// How far in the future a challenge timestamp may lie
pub const DEFAULT_MAX_CLOCK_SKEW_SECS: i64 = 30;

/// Settings the auth service is constructed from
#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: String,
    pub token_ttl: Duration,
    pub challenge_window: Duration,
    pub max_clock_skew: Duration,
}

impl AuthConfig {
    /// Build a config around a signing secret, rejecting absent or short secrets
    pub fn new(jwt_secret: impl Into<String>) -> Result<Self, ConfigError> {
        let jwt_secret = jwt_secret.into();

        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string()));
        }
        if jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::WeakSecret(MIN_SECRET_LENGTH));
        }

        Ok(Self {
            jwt_secret,
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            challenge_window: Duration::seconds(DEFAULT_CHALLENGE_WINDOW_SECS),
            max_clock_skew: Duration::seconds(DEFAULT_MAX_CLOCK_SKEW_SECS),
        })
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_challenge_window(mut self, window: Duration) -> Self {
        self.challenge_window = window;
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[redacted]")
            .field("token_ttl", &self.token_ttl)
            .field("challenge_window", &self.challenge_window)
            .field("max_clock_skew", &self.max_clock_skew)
            .finish()
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    challenge_window: Duration,
    max_clock_skew: Duration,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl: config.token_ttl,
            challenge_window: config.challenge_window,
            max_clock_skew: config.max_clock_skew,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Check a challenge timestamp (epoch ms) against the freshness window
    ///
    /// Exactly `challenge_window` old is still fresh.
    /// A timestamp too far from `now` to measure is `InvalidTimestamp`.
    pub fn check_freshness(&self, timestamp_ms: i64, now: DateTime<Utc>) -> AuthResult<()> {
        let age_ms = now
            .timestamp_millis()
            .checked_sub(timestamp_ms)
            .ok_or(AuthError::InvalidTimestamp)?;

        if age_ms > self.challenge_window.num_milliseconds() {
            return Err(AuthError::ChallengeExpired);
        }

        let ahead_ms = age_ms.checked_neg().ok_or(AuthError::InvalidTimestamp)?;
        if ahead_ms > self.max_clock_skew.num_milliseconds() {
            return Err(AuthError::InvalidTimestamp);
        }
        Ok(())
    }

    /// Verify a signed challenge: freshness first, then key, then signature
    pub fn verify_challenge(
        &self,
        challenge: &SignedChallenge,
        now: DateTime<Utc>,
    ) -> AuthResult<()> {
        self.check_freshness(challenge.timestamp, now)?;

        // A canonical message carries its own, signed, timestamp
        if let Some(signed_at) = AuthChallenge::parse_timestamp(&challenge.message) {
            self.check_freshness(signed_at, now)?;
        }

        let verified = verify_wallet_signature(
            &challenge.message,
            &challenge.signature,
            &challenge.public_key,
        )?;

        if !verified {
            tracing::warn!(wallet = %challenge.public_key, "Wallet signature did not verify");
            return Err(AuthError::SignatureMismatch);
        }

        Ok(())
    }

    /// Verify a signed challenge and issue a session token for its wallet
    pub fn create_token(&self, challenge: &SignedChallenge) -> AuthResult<String> {
        self.create_token_at(challenge, Utc::now())
    }

    /// [`AuthService::create_token`] with an explicit clock
    pub fn create_token_at(
        &self,
        challenge: &SignedChallenge,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        self.verify_challenge(challenge, now)?;
        let token = self.issue_token_at(&challenge.public_key, now)?;

        tracing::info!(wallet = %challenge.public_key, "Issued session token");
        Ok(token)
    }

    /// Issue a session token bound to `wallet_address`
    ///
    /// Callers must have verified the wallet's signature first.
    pub fn issue_token(&self, wallet_address: &str) -> AuthResult<String> {
        self.issue_token_at(wallet_address, Utc::now())
    }

    pub fn issue_token_at(
        &self,
        wallet_address: &str,
        issued_at: DateTime<Utc>,
    ) -> AuthResult<String> {
        generate_session_token(wallet_address, issued_at, self.token_ttl, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = %e, "Session token signing failed");
                AuthError::TokenCreation
            })
    }

    /// Decode a session token, checking signature and expiry only
    pub fn decode_token(&self, token: &str) -> AuthResult<Claims> {
        verify_session_token(token, &self.decoding_key).map_err(AuthError::from)
    }

    /// Validate a bearer token against the wallet address presented with it
    ///
    /// Presence of both inputs is checked before any cryptographic work.
    /// Returns the bound wallet address on success.
    pub fn validate_token(
        &self,
        token: Option<&str>,
        claimed_address: Option<&str>,
    ) -> AuthResult<String> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;
        let claimed_address = claimed_address
            .filter(|a| !a.is_empty())
            .ok_or(AuthError::AddressMissing)?;

        let claims = self.decode_token(token).map_err(|e| {
            tracing::info!(error = %e, "Token verification failed");
            e
        })?;

        if claims.wallet_address != claimed_address {
            tracing::warn!(
                token_wallet = %claims.wallet_address,
                current_wallet = %claimed_address,
                "Token wallet mismatch"
            );
            return Err(AuthError::TokenWalletMismatch {
                token_wallet: claims.wallet_address,
                current_wallet: claimed_address.to_string(),
            });
        }

        Ok(claims.wallet_address)
    }
}
