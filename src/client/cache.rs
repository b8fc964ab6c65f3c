//! Cached session token and the wallet it belongs to

use serde::{Deserialize, Serialize};

/// The client's cached credentials
///
/// `token` is only ever kept for `address`: rebinding to another wallet or
/// disconnecting drops it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAuthCache {
    pub token: Option<String>,
    pub address: Option<String>,
}

impl ClientAuthCache {
    /// Token cached for exactly `address`
    pub fn token_for(&self, address: &str) -> Option<&str> {
        match (&self.token, &self.address) {
            (Some(token), Some(cached)) if cached == address => Some(token.as_str()),
            _ => None,
        }
    }

    /// Point the cache at `address`
    ///
    /// Returns true if the address changed, in which case the token was dropped.
    pub fn rebind(&mut self, address: Option<&str>) -> bool {
        if self.address.as_deref() == address {
            return false;
        }
        self.token = None;
        self.address = address.map(str::to_string);
        true
    }

    pub fn set_token(&mut self, token: String, address: &str) {
        self.token = Some(token);
        self.address = Some(address.to_string());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.address = None;
    }
}

/// Persistence for the cache, e.g. browser local storage
pub trait TokenStore: Send {
    fn load(&self) -> ClientAuthCache;
    fn save(&mut self, cache: &ClientAuthCache);
}

/// In-process token store
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    cache: ClientAuthCache,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: ClientAuthCache) -> Self {
        Self { cache }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientAuthCache {
        self.cache.clone()
    }

    fn save(&mut self, cache: &ClientAuthCache) {
        self.cache = cache.clone();
    }
}
