//! HTTP client for the account directory service

use crate::directory::{Account, AccountDirectory, DirectoryError};
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
struct VerifyPasswordRequest<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyPasswordResponse {
    valid: bool,
}

/// Client for the remote account directory REST API.
#[derive(Clone)]
pub struct HttpDirectory {
    client: Client,
    base_url: String,
}

impl HttpDirectory {
    /// Create a new directory client for the given base URL.
    pub fn new(client: Client, base_url: &str) -> Result<Self, DirectoryError> {
        Url::parse(base_url)
            .map_err(|e| DirectoryError::Config(format!("invalid directory URL: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch an account snapshot; 404 means the account does not exist.
    async fn fetch_account(&self, url: String) -> Result<Option<Account>, DirectoryError> {
        debug!("Fetching account from directory: {}", url);
        let response = self.client.get(&url).send().await?;

        if response.status() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }

        Ok(Some(response.json().await?))
    }

    async fn api_error(&self, response: reqwest::Response) -> DirectoryError {
        let status = response.status();
        let detail = response.text().await.unwrap_or_default();
        error!("Directory API error {}: {}", status, detail);
        DirectoryError::Api(format!("HTTP {status}: {detail}"))
    }
}

#[async_trait::async_trait]
impl AccountDirectory for HttpDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DirectoryError> {
        self.fetch_account(format!(
            "{}/v1/accounts/by-username/{}",
            self.base_url, username
        ))
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DirectoryError> {
        self.fetch_account(format!("{}/v1/accounts/{}", self.base_url, id))
            .await
    }

    async fn roles(&self, id: &str) -> Result<Vec<String>, DirectoryError> {
        let url = format!("{}/v1/accounts/{}/roles", self.base_url, id);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn verify_password(&self, id: &str, password: &str) -> Result<bool, DirectoryError> {
        let url = format!("{}/v1/accounts/{}/password/verify", self.base_url, id);
        let response = self
            .client
            .post(&url)
            .json(&VerifyPasswordRequest { password })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }
        let body: VerifyPasswordResponse = response.json().await?;
        Ok(body.valid)
    }

    async fn record_failed_attempt(&self, id: &str) -> Result<(), DirectoryError> {
        let url = format!("{}/v1/accounts/{}/failed-attempts", self.base_url, id);
        let response = self.client.post(&url).send().await?;
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }
        debug!("Recorded failed sign-in attempt for account '{}'", id);
        Ok(())
    }

    async fn reset_failure_count(&self, id: &str) -> Result<(), DirectoryError> {
        let url = format!("{}/v1/accounts/{}/failed-attempts", self.base_url, id);
        let response = self.client.delete(&url).send().await?;
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }
        debug!("Reset failure counter for account '{}'", id);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), String> {
        let url = format!("{}/healthy", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(format!("directory returned HTTP {}", response.status())),
            Err(e) => Err(format!("directory unreachable: {e}")),
        }
    }
}
