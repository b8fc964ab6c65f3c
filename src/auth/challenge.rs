//! Wallet challenge messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of the message a wallet signs to authenticate
pub const CHALLENGE_PREFIX: &str = "Authenticate with your wallet: ";

/// A challenge built client-side for a single authentication attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub message: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl AuthChallenge {
    pub fn new(now: DateTime<Utc>) -> Self {
        let timestamp = now.timestamp_millis();
        Self {
            message: format!("{}{}", CHALLENGE_PREFIX, timestamp),
            timestamp,
        }
    }

    /// Recover the timestamp embedded in a canonical challenge message
    ///
    /// Returns `None` for messages not built by [`AuthChallenge::new`].
    pub fn parse_timestamp(message: &str) -> Option<i64> {
        message
            .strip_prefix(CHALLENGE_PREFIX)
            .and_then(|rest| rest.trim().parse::<i64>().ok())
    }

    /// Attach the wallet's signature
    pub fn into_signed(self, signature: String, public_key: String) -> SignedChallenge {
        SignedChallenge {
            signature,
            public_key,
            message: self.message,
            timestamp: self.timestamp,
        }
    }
}

/// A challenge signed by a wallet, as sent to `create-token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedChallenge {
    /// Base58-encoded detached signature
    pub signature: String,
    /// Base58-encoded wallet address
    pub public_key: String,
    pub message: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}
