//! Client for the external token issuer service
//!
//! The issuer owns all cryptographic signing, token storage, and revocation;
//! this service only hands it a finished principal and relays the token
//! material it mints.

use crate::oauth::principal::Principal;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use utoipa::ToSchema;

/// Errors raised by issuer operations.
#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("issuer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("issuer API error: {0}")]
    Api(String),
    #[error("issuer configuration error: {0}")]
    Config(String),
}

/// Token material minted by the issuer, relayed to the client verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// The access token string
    pub access_token: String,
    /// Token type - always "Bearer"
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Identity token, when the principal carries identity-destined claims
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Refresh token embedding the signed principal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    principal: &'a Principal,
}

/// Client for the token issuer REST API.
#[derive(Clone)]
pub struct IssuerClient {
    client: Client,
    base_url: String,
}

impl IssuerClient {
    /// Create a new issuer client for the given base URL.
    pub fn new(client: Client, base_url: &str) -> Result<Self, IssuerError> {
        Url::parse(base_url)
            .map_err(|e| IssuerError::Config(format!("invalid issuer URL: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Hand a finished principal to the issuer for signing and emission.
    pub async fn sign(&self, principal: &Principal) -> Result<TokenResponse, IssuerError> {
        let url = format!("{}/v1/tokens/sign", self.base_url);
        debug!("Forwarding principal to issuer at: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&SignRequest { principal })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!("Issuer API error {}: {}", status, detail);
            return Err(IssuerError::Api(format!("HTTP {status}: {detail}")));
        }

        Ok(response.json().await?)
    }

    /// Probe the issuer; `Err` carries a human-readable cause.
    pub async fn health_check(&self) -> Result<(), String> {
        let url = format!("{}/healthy", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(format!("issuer returned HTTP {}", response.status())),
            Err(e) => Err(format!("issuer unreachable: {e}")),
        }
    }
}
