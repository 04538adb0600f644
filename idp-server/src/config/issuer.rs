//! Token issuer configuration

use confique::Config;

/// Token issuer configuration
#[derive(Debug, Config, Clone)]
pub struct IssuerConfig {
    /// Base URL of the token issuer service (default: http://localhost:7100)
    #[config(env = "IDP_ISSUER_URL", default = "http://localhost:7100")]
    pub url: String,

    /// Per-request timeout towards the issuer, in seconds (default: 5)
    #[config(env = "IDP_ISSUER_CLIENT_TIMEOUT", default = 5)]
    pub client_timeout: u64,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7100".to_string(),
            client_timeout: 5,
        }
    }
}
