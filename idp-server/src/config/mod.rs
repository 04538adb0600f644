pub(crate) use crate::config::directory::{DirectoryConfig, DirectoryStore};
pub(crate) use crate::config::issuer::IssuerConfig;
use confique::Config;

pub mod directory;
pub mod issuer;

/// Main configuration structure for the identity server
#[derive(Debug, Config, Clone)]
pub struct IdpConfig {
    /// The port the identity server will listen to (default: 8090)
    #[config(env = "IDP_PORT", default = 8090)]
    pub port: u16,

    /// Account directory configuration
    #[config(nested)]
    pub directory: DirectoryConfig,

    /// Token issuer configuration
    #[config(nested)]
    pub issuer: IssuerConfig,
}

impl Default for IdpConfig {
    fn default() -> Self {
        Self {
            port: 8090,
            directory: DirectoryConfig::default(),
            issuer: IssuerConfig::default(),
        }
    }
}

impl IdpConfig {
    /// Creates a new config instance from environment variables
    pub fn new() -> Result<Self, confique::Error> {
        Self::builder().env().load()
    }
}
