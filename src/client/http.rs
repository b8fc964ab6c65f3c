//! HTTP implementation of [`AuthBackend`]

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use crate::auth::SignedChallenge;
use crate::error::ErrorResponse;
use crate::models::{TokenResponse, TokenValidResponse};

use super::{AuthBackend, GateError};

/// Talks to the auth endpoints over HTTP
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    client: Client,
    base_url: String,
}

impl HttpAuthBackend {
    /// `base_url` is where the auth routes are mounted, e.g.
    /// `https://prompt.rip/api/auth`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn rejection(response: Response) -> GateError {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => GateError::Rejected {
            status: status.as_u16(),
            body,
        },
        Err(e) => GateError::Transport(format!("unexpected {} response: {}", status, e)),
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn verify_token(&self, token: &str, address: &str) -> Result<(), GateError> {
        let response = self
            .client
            .get(self.url("verify-token"))
            .bearer_auth(token)
            .header("address", address)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(rejection(response).await);
        }

        let body: TokenValidResponse = response.json().await?;
        if body.valid && body.wallet_address == address {
            Ok(())
        } else {
            Err(GateError::Transport(
                "verify-token answered 200 without a matching wallet".to_string(),
            ))
        }
    }

    async fn create_token(&self, challenge: &SignedChallenge) -> Result<String, GateError> {
        let response = self
            .client
            .post(self.url("create-token"))
            .header("signature", &challenge.signature)
            .header("publickey", &challenge.public_key)
            .header("message", &challenge.message)
            .header("timestamp", challenge.timestamp.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: TokenResponse = response.json().await?;
        Ok(body.token)
    }
}
