//! Session token generation and validation
//!
//! Session tokens are HS256 JWTs that carry the wallet address they were
//! issued to. The server keeps no record of them.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT-related errors
///
/// The display strings are returned to clients verbatim, so they stay short
/// and stable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("jwt expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("jwt malformed")]
    Malformed(String),
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Wallet address the token is bound to
    pub wallet_address: String,
    /// Issuance time in epoch milliseconds
    pub timestamp: i64,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn new(wallet_address: &str, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            timestamp: issued_at.timestamp_millis(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

/// Sign a session token for a wallet
///
/// # Arguments
/// * `wallet_address` - Address the token is bound to
/// * `issued_at` - Issuance time; expiry is `issued_at + ttl`
/// * `ttl` - Token lifetime
/// * `key` - HMAC signing key
pub fn generate_session_token(
    wallet_address: &str,
    issued_at: DateTime<Utc>,
    ttl: Duration,
    key: &EncodingKey,
) -> Result<String, JwtError> {
    if issued_at.checked_add_signed(ttl).is_none() {
        return Err(JwtError::EncodingFailed("expiry out of range".to_string()));
    }
    let claims = Claims::new(wallet_address, issued_at, ttl);

    encode(&Header::new(Algorithm::HS256), &claims, key)
        .map_err(|e| JwtError::EncodingFailed(e.to_string()))
}

/// Verify signature and expiry of a session token and decode its claims
///
/// Expiry is checked with zero leeway.
pub fn verify_session_token(token: &str, key: &DecodingKey) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::Malformed(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-that-is-long-enough!";
    const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    fn keys(secret: &[u8]) -> (EncodingKey, DecodingKey) {
        (
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
        )
    }

    #[test]
    fn test_generate_and_verify() {
        let (enc, dec) = keys(SECRET);
        let now = Utc::now();

        let token = generate_session_token(WALLET, now, Duration::hours(168), &enc).unwrap();
        let claims = verify_session_token(&token, &dec).unwrap();

        assert_eq!(claims.wallet_address, WALLET);
        assert_eq!(claims.timestamp, now.timestamp_millis());
        assert_eq!(claims.exp - claims.iat, 168 * 60 * 60);
    }

    #[test]
    fn test_expiry_out_of_range() {
        let (enc, _) = keys(SECRET);

        let result =
            generate_session_token(WALLET, DateTime::<Utc>::MAX_UTC, Duration::hours(1), &enc);

        assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
    }

    #[test]
    fn test_claims_use_camel_case() {
        let claims = Claims::new(WALLET, Utc::now(), Duration::hours(1));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["walletAddress"], WALLET);
        assert!(json.get("timestamp").is_some());
        assert!(json.get("wallet_address").is_none());
    }

    #[test]
    fn test_expired_token() {
        let (enc, dec) = keys(SECRET);
        let issued_at = Utc::now() - Duration::hours(168) - Duration::seconds(1);

        let token = generate_session_token(WALLET, issued_at, Duration::hours(168), &enc).unwrap();

        assert_eq!(verify_session_token(&token, &dec), Err(JwtError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let (enc, _) = keys(SECRET);
        let (_, other_dec) = keys(b"a-completely-different-secret-value!!");

        let token = generate_session_token(WALLET, Utc::now(), Duration::hours(1), &enc).unwrap();

        assert_eq!(
            verify_session_token(&token, &other_dec),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_token() {
        let (_, dec) = keys(SECRET);
        let result = verify_session_token("invalid.token.here", &dec);

        assert!(matches!(result, Err(JwtError::Malformed(_))));
        assert_eq!(result.unwrap_err().to_string(), "jwt malformed");
    }
}
