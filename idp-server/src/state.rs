use crate::config::IdpConfig;
use crate::directory::{create_directory, AccountDirectory, Directory, DirectoryError};
use crate::issuer::{IssuerClient, IssuerError};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use log::warn;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while wiring the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Issuer(#[from] IssuerError),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<IdpConfig>,
    pub directory: Directory,
    pub issuer: IssuerClient,
}

impl AppState {
    /// Specialized client for a collaborator service with sane timeouts and
    /// a pooled connection set.
    fn create_collaborator_client(timeout: u64) -> Client {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Client::builder()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(2))
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .expect("Failed to create collaborator client")
    }

    pub fn new(config: IdpConfig) -> Result<Self, StateError> {
        let directory = create_directory(
            &config.directory,
            Self::create_collaborator_client(config.directory.client_timeout),
        )?;
        let issuer = IssuerClient::new(
            Self::create_collaborator_client(config.issuer.client_timeout),
            &config.issuer.url,
        )?;

        Ok(Self {
            config: Arc::new(config),
            directory,
            issuer,
        })
    }

    /// Check if all collaborators are reachable.
    pub async fn health_check(&self) -> bool {
        if let Err(cause) = self.directory.health_check().await {
            warn!("Directory health check failed: {}", cause);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DirectoryConfig, DirectoryStore};

    #[test]
    fn test_state_wires_the_configured_directory() {
        let state = AppState::new(IdpConfig::default()).expect("Failed to create state");
        assert!(matches!(state.directory, Directory::InMemory(_)));
        assert_eq!(state.config.port, 8090);
    }

    #[test]
    fn test_state_rejects_http_store_without_url() {
        let config = IdpConfig {
            directory: DirectoryConfig {
                store: DirectoryStore::Http,
                url: String::new(),
                client_timeout: 5,
            },
            ..IdpConfig::default()
        };
        assert!(matches!(
            AppState::new(config),
            Err(StateError::Directory(DirectoryError::Config(_)))
        ));
    }

    #[test]
    fn test_state_clone_shares_configuration() {
        let state = AppState::new(IdpConfig::default()).expect("Failed to create state");
        let clone = state.clone();
        assert_eq!(Arc::as_ptr(&state.config), Arc::as_ptr(&clone.config));
    }

    #[tokio::test]
    async fn test_in_memory_state_is_healthy() {
        let state = AppState::new(IdpConfig::default()).expect("Failed to create state");
        assert!(state.health_check().await);
    }
}
