//! Account Directory collaborator
//!
//! The directory owns account storage, password hashing, and the
//! lockout/failure counters; this service only ever reads account snapshots
//! and delegates counter mutations as atomic remote operations. Two backends
//! exist behind a common trait: an HTTP client for the real directory
//! service and an in-memory implementation for development and tests.

use crate::config::{DirectoryConfig, DirectoryStore};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;
pub mod memory;

/// Errors raised by directory operations.
///
/// These are infrastructure failures and must never be conflated with an
/// account being invalid; "account not found" is an `Ok(None)` lookup
/// result, not an error.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("directory API error: {0}")]
    Api(String),
    #[error("directory configuration error: {0}")]
    Config(String),
}

/// A point-in-time snapshot of an account as the directory reports it.
///
/// `sign_in_allowed` and `locked_out` carry the directory's answers at fetch
/// time; eligibility is always re-evaluated from a fresh snapshot, so the
/// engine never caches these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub sign_in_allowed: bool,
    /// Whether the directory tracks lockout for this account at all.
    pub lockout_enabled: bool,
    pub locked_out: bool,
}

/// The contract every directory backend must fulfill.
#[async_trait::async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Resolve a username to an account snapshot.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DirectoryError>;

    /// Resolve a stable account identifier to an account snapshot.
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DirectoryError>;

    /// Roles held by the account, in the order the directory returns them.
    async fn roles(&self, id: &str) -> Result<Vec<String>, DirectoryError>;

    /// Check a presented password against the directory's stored credential.
    async fn verify_password(&self, id: &str, password: &str) -> Result<bool, DirectoryError>;

    /// Count a failed sign-in attempt towards the account's lockout.
    async fn record_failed_attempt(&self, id: &str) -> Result<(), DirectoryError>;

    /// Clear the account's failure counter after a successful sign-in.
    async fn reset_failure_count(&self, id: &str) -> Result<(), DirectoryError>;

    /// Probe the backend; `Err` carries a human-readable cause.
    async fn health_check(&self) -> Result<(), String>;
}

/// Directory backend selected at startup from the configuration.
///
/// The enum gives the rest of the service a concrete, cloneable handle while
/// keeping the backend swappable without touching call sites.
#[derive(Clone)]
pub enum Directory {
    InMemory(memory::InMemoryDirectory),
    Http(http::HttpDirectory),
}

#[async_trait::async_trait]
impl AccountDirectory for Directory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DirectoryError> {
        match self {
            Self::InMemory(directory) => directory.find_by_username(username).await,
            Self::Http(directory) => directory.find_by_username(username).await,
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DirectoryError> {
        match self {
            Self::InMemory(directory) => directory.find_by_id(id).await,
            Self::Http(directory) => directory.find_by_id(id).await,
        }
    }

    async fn roles(&self, id: &str) -> Result<Vec<String>, DirectoryError> {
        match self {
            Self::InMemory(directory) => directory.roles(id).await,
            Self::Http(directory) => directory.roles(id).await,
        }
    }

    async fn verify_password(&self, id: &str, password: &str) -> Result<bool, DirectoryError> {
        match self {
            Self::InMemory(directory) => directory.verify_password(id, password).await,
            Self::Http(directory) => directory.verify_password(id, password).await,
        }
    }

    async fn record_failed_attempt(&self, id: &str) -> Result<(), DirectoryError> {
        match self {
            Self::InMemory(directory) => directory.record_failed_attempt(id).await,
            Self::Http(directory) => directory.record_failed_attempt(id).await,
        }
    }

    async fn reset_failure_count(&self, id: &str) -> Result<(), DirectoryError> {
        match self {
            Self::InMemory(directory) => directory.reset_failure_count(id).await,
            Self::Http(directory) => directory.reset_failure_count(id).await,
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        match self {
            Self::InMemory(directory) => directory.health_check().await,
            Self::Http(directory) => directory.health_check().await,
        }
    }
}

/// Create the directory backend selected by the configuration.
pub fn create_directory(
    config: &DirectoryConfig,
    client: reqwest::Client,
) -> Result<Directory, DirectoryError> {
    match config.store {
        DirectoryStore::InMemory => {
            warn!("Using the in-memory account directory; accounts do not persist");
            Ok(Directory::InMemory(memory::InMemoryDirectory::new()))
        }
        DirectoryStore::Http => {
            if config.url.is_empty() {
                return Err(DirectoryError::Config(
                    "directory URL is required for the http store".to_string(),
                ));
            }
            Ok(Directory::Http(http::HttpDirectory::new(
                client,
                &config.url,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_memory_directory() {
        let config = DirectoryConfig::default();
        let directory = create_directory(&config, reqwest::Client::new())
            .expect("Failed to create directory");
        assert!(matches!(directory, Directory::InMemory(_)));
    }

    #[test]
    fn test_http_store_requires_a_url() {
        let config = DirectoryConfig {
            store: DirectoryStore::Http,
            url: String::new(),
            client_timeout: 5,
        };
        let result = create_directory(&config, reqwest::Client::new());
        assert!(matches!(result, Err(DirectoryError::Config(_))));
    }

    #[test]
    fn test_http_store_rejects_invalid_url() {
        let config = DirectoryConfig {
            store: DirectoryStore::Http,
            url: "not a url".to_string(),
            client_timeout: 5,
        };
        let result = create_directory(&config, reqwest::Client::new());
        assert!(matches!(result, Err(DirectoryError::Config(_))));
    }
}
