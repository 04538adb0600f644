//! Account directory configuration

use confique::Config;
use serde::Deserialize;

/// Which account directory backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectoryStore {
    /// Development/test backend; accounts do not persist
    InMemory,
    /// Remote directory service over HTTP
    Http,
}

/// Account directory configuration
#[derive(Debug, Config, Clone)]
pub struct DirectoryConfig {
    /// Directory backend to use (default: in-memory)
    #[config(env = "IDP_DIRECTORY_STORE", default = "in-memory")]
    pub store: DirectoryStore,

    /// Base URL of the account directory service (required for the http store)
    #[config(env = "IDP_DIRECTORY_URL", default = "")]
    pub url: String,

    /// Per-request timeout towards the directory, in seconds (default: 5)
    #[config(env = "IDP_DIRECTORY_CLIENT_TIMEOUT", default = 5)]
    pub client_timeout: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            store: DirectoryStore::InMemory,
            url: String::new(),
            client_timeout: 5,
        }
    }
}
