//! Token endpoint request/response models

use crate::oauth::models::GrantType;
use crate::oauth::principal::Principal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// OAuth 2.0 Token Request wire form (RFC 6749 Section 4)
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequestForm {
    /// OAuth 2.0 grant type
    #[serde(default)]
    pub grant_type: Option<String>,
    /// Client identifier
    #[serde(default)]
    pub client_id: Option<String>,
    /// Resource owner username (password grant)
    #[serde(default)]
    pub username: Option<String>,
    /// Resource owner password (password grant)
    #[serde(default)]
    pub password: Option<String>,
    /// Requested scopes (space-separated)
    #[serde(default)]
    pub scope: Option<String>,
    /// Opaque refresh token (refresh_token grant); validated upstream
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Authorization code (authorization_code grant); validated upstream
    #[serde(default)]
    pub code: Option<String>,
    /// Device code (device_code grant); validated upstream
    #[serde(default)]
    pub device_code: Option<String>,
}

impl TokenRequestForm {
    /// Wire-level presence check for the parameter carrying the grant's
    /// credential artifact. The artifact itself is consumed by the upstream
    /// authentication middleware, not here.
    pub(crate) fn missing_parameter(&self, grant_type: GrantType) -> Option<&'static str> {
        let absent = |value: &Option<String>| value.as_deref().is_none_or(str::is_empty);
        match grant_type {
            GrantType::RefreshToken if absent(&self.refresh_token) => Some("refresh_token"),
            GrantType::AuthorizationCode if absent(&self.code) => Some("code"),
            GrantType::DeviceCode if absent(&self.device_code) => Some("device_code"),
            _ => None,
        }
    }
}

/// OAuth 2.0 Error Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OAuthError {
    /// Error code
    pub error: String,
    /// Human-readable error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl OAuthError {
    /// Create an invalid_request error
    pub fn invalid_request(description: &str) -> Self {
        Self {
            error: "invalid_request".to_string(),
            error_description: Some(description.to_string()),
        }
    }

    /// Create an invalid_grant error
    pub fn invalid_grant(description: &str) -> Self {
        Self {
            error: "invalid_grant".to_string(),
            error_description: Some(description.to_string()),
        }
    }

    /// Create an unsupported_grant_type error
    pub fn unsupported_grant_type() -> Self {
        Self {
            error: "unsupported_grant_type".to_string(),
            error_description: Some(
                "Supported grant types: password, client_credentials, refresh_token, \
                 authorization_code, device_code"
                    .to_string(),
            ),
        }
    }

    /// Create a server_error
    pub fn server_error(description: &str) -> Self {
        Self {
            error: "server_error".to_string(),
            error_description: Some(description.to_string()),
        }
    }
}

/// Principal recovered by the upstream authentication middleware from the
/// presented refresh token, authorization code, or device code.
///
/// Injected into the request as an extension; the handler passes it to the
/// dispatcher explicitly instead of reading ambient request state.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub Principal);
