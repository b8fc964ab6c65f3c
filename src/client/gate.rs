//! Request gate: reuse a cached token or sign a fresh challenge

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::auth::AuthChallenge;

use super::cache::{ClientAuthCache, TokenStore};
use super::{AuthBackend, GateError, WalletSigner};

/// Where the cache stands before a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    NoToken,
    HasToken,
}

/// How the token in an [`AuthorizedRequest`] was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cached,
    Signed,
}

/// Credentials for one authorized request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedRequest {
    pub wallet_address: String,
    pub token: String,
    pub source: TokenSource,
}

impl AuthorizedRequest {
    /// Value for the `Authorization` header
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Attach the bearer token and wallet address to an outgoing request
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("address", &self.wallet_address)
    }
}

/// Client-side authentication state machine
///
/// `authorize` holds the cache lock for its whole run, so concurrent calls
/// are serialized and the cache is only ever written by one of them.
pub struct AuthGate<W, B, T> {
    signer: W,
    backend: B,
    store: Mutex<T>,
    // Bumped on every wallet change; tokens from an older generation are dropped
    generation: AtomicU64,
}

impl<W, B, T> AuthGate<W, B, T>
where
    W: WalletSigner,
    B: AuthBackend,
    T: TokenStore,
{
    pub fn new(signer: W, backend: B, store: T) -> Self {
        Self {
            signer,
            backend,
            store: Mutex::new(store),
            generation: AtomicU64::new(0),
        }
    }

    pub fn signer(&self) -> &W {
        &self.signer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Snapshot of the cached credentials
    pub async fn cache(&self) -> ClientAuthCache {
        self.store.lock().await.load()
    }

    /// State the next `authorize` call would start from
    pub async fn state(&self) -> GateState {
        let cache = self.store.lock().await.load();
        match self.signer.address() {
            Some(address) if cache.token_for(&address).is_some() => GateState::HasToken,
            _ => GateState::NoToken,
        }
    }

    /// Record that the active wallet changed or disconnected
    pub async fn wallet_changed(&self, address: Option<&str>) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let mut store = self.store.lock().await;
        let mut cache = store.load();
        if address.is_none() {
            cache.clear();
        } else if cache.rebind(address) {
            tracing::debug!(wallet = ?address, "Wallet changed, cleared cached token");
        }
        store.save(&cache);
    }

    /// Get credentials for one paid action
    ///
    /// A cached token is validated first. If that fails, the token is dropped
    /// and the wallet signs a new challenge, once. A failed signature flow
    /// is returned to the caller as-is.
    pub async fn authorize(&self) -> Result<AuthorizedRequest, GateError> {
        let mut store = self.store.lock().await;
        let generation = self.generation.load(Ordering::SeqCst);

        let address = self.signer.address().ok_or(GateError::WalletNotConnected)?;

        let mut cache = store.load();
        if cache.rebind(Some(address.as_str())) {
            tracing::debug!(wallet = %address, "Cached token belongs to another wallet, cleared");
            store.save(&cache);
        }

        if let Some(token) = cache.token_for(&address).map(str::to_string) {
            match self.backend.verify_token(&token, &address).await {
                Ok(()) => {
                    return Ok(AuthorizedRequest {
                        wallet_address: address,
                        token,
                        source: TokenSource::Cached,
                    })
                }
                Err(e) => {
                    tracing::info!(error = %e, "Cached token rejected, re-signing");
                    cache.clear_token();
                    store.save(&cache);
                }
            }
        }

        let token = self.sign_in(&address).await?;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::warn!(wallet = %address, "Wallet changed while signing, discarding token");
            return Err(GateError::WalletChanged);
        }

        cache.set_token(token.clone(), &address);
        store.save(&cache);

        Ok(AuthorizedRequest {
            wallet_address: address,
            token,
            source: TokenSource::Signed,
        })
    }

    async fn sign_in(&self, address: &str) -> Result<String, GateError> {
        let challenge = AuthChallenge::new(Utc::now());
        let signature = self
            .signer
            .sign_message(challenge.message.as_bytes())
            .await?;

        let signed = challenge.into_signed(
            bs58::encode(signature).into_string(),
            address.to_string(),
        );

        self.backend.create_token(&signed).await
    }
}
