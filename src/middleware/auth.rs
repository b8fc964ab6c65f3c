//! Authentication middleware
//!
//! Extractors for wallet-signature authentication and bearer-token checks.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::sync::Arc;

use crate::auth::{AuthService, SignedChallenge};
use crate::error::AuthError;

/// Header carrying the caller's current wallet address
pub const ADDRESS_HEADER: &str = "address";
pub const SIGNATURE_HEADER: &str = "signature";
pub const PUBLIC_KEY_HEADER: &str = "publickey";
pub const MESSAGE_HEADER: &str = "message";
pub const TIMESTAMP_HEADER: &str = "timestamp";

/// Bearer token from the Authorization header, if well-formed
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
        .filter(|token| !token.is_empty())
}

/// Wallet address the caller claims to be acting as
pub fn wallet_address(headers: &HeaderMap) -> Option<String> {
    header_str(headers, ADDRESS_HEADER).map(str::to_string)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn has_signature_headers(headers: &HeaderMap) -> bool {
    [SIGNATURE_HEADER, PUBLIC_KEY_HEADER, MESSAGE_HEADER, TIMESTAMP_HEADER]
        .iter()
        .any(|name| headers.contains_key(*name))
}

/// Read a signed challenge from the `signature`, `publickey`, `message` and
/// `timestamp` headers
///
/// All four must be present and non-empty, and the timestamp must be an
/// integer in epoch milliseconds.
pub fn signed_challenge_from_headers(headers: &HeaderMap) -> Result<SignedChallenge, AuthError> {
    let (Some(signature), Some(public_key), Some(message), Some(timestamp)) = (
        header_str(headers, SIGNATURE_HEADER),
        header_str(headers, PUBLIC_KEY_HEADER),
        header_str(headers, MESSAGE_HEADER),
        header_str(headers, TIMESTAMP_HEADER),
    ) else {
        return Err(AuthError::MissingCredential);
    };

    let timestamp = timestamp
        .trim()
        .parse::<i64>()
        .map_err(|_| AuthError::InvalidTimestamp)?;

    Ok(SignedChallenge {
        signature: signature.to_string(),
        public_key: public_key.to_string(),
        message: message.to_string(),
        timestamp,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for SignedChallenge
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        signed_challenge_from_headers(&parts.headers)
    }
}

/// Wallet authenticated either by a bound session token or a fresh signature
#[derive(Debug, Clone)]
pub struct WalletAuth {
    pub wallet_address: String,
    /// The presented token, or a newly issued one
    pub token: String,
}

/// Extractor for authenticated wallets
///
/// With `Authorization: Bearer` present the token is validated against the
/// `address` header. Without one, or when the token fails and the request
/// also carries a signed challenge, the challenge is verified and a new
/// token is issued.
///
/// # Example
///
/// ```rust,ignore
/// async fn paid_action(auth: WalletAuth) -> impl IntoResponse {
///     format!("Hello, {}", auth.wallet_address)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for WalletAuth
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_service = Arc::<AuthService>::from_ref(state);

        if let Some(token) = bearer_token(&parts.headers) {
            let address = wallet_address(&parts.headers);

            match auth_service.validate_token(Some(token.as_str()), address.as_deref()) {
                Ok(wallet_address) => {
                    return Ok(WalletAuth {
                        wallet_address,
                        token,
                    })
                }
                Err(e) if !has_signature_headers(&parts.headers) => return Err(e),
                Err(e) => {
                    tracing::debug!(error = %e, "Bearer token rejected, trying wallet signature");
                }
            }
        }

        let challenge = signed_challenge_from_headers(&parts.headers)?;
        let token = auth_service.create_token(&challenge)?;

        Ok(WalletAuth {
            wallet_address: challenge.public_key,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_token() {
        let map = headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(bearer_token(&map).as_deref(), Some("abc.def.ghi"));

        let map = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(bearer_token(&map), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_signed_challenge_headers() {
        let map = headers(&[
            ("signature", "sig"),
            ("publickey", "key"),
            ("message", "Authenticate with your wallet: 1"),
            ("timestamp", "1700000000000"),
        ]);

        let challenge = signed_challenge_from_headers(&map).unwrap();
        assert_eq!(challenge.public_key, "key");
        assert_eq!(challenge.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_signed_challenge_missing_header() {
        let map = headers(&[
            ("publickey", "key"),
            ("message", "hello"),
            ("timestamp", "1700000000000"),
        ]);
        assert_eq!(
            signed_challenge_from_headers(&map),
            Err(AuthError::MissingCredential)
        );

        let map = headers(&[
            ("signature", ""),
            ("publickey", "key"),
            ("message", "hello"),
            ("timestamp", "1700000000000"),
        ]);
        assert_eq!(
            signed_challenge_from_headers(&map),
            Err(AuthError::MissingCredential)
        );
    }

    #[test]
    fn test_signed_challenge_bad_timestamp() {
        let map = headers(&[
            ("signature", "sig"),
            ("publickey", "key"),
            ("message", "hello"),
            ("timestamp", "yesterday"),
        ]);
        assert_eq!(
            signed_challenge_from_headers(&map),
            Err(AuthError::InvalidTimestamp)
        );
    }
}
