//! Token request model and grant type parsing

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// OAuth 2.0 grant types accepted by the token endpoint.
///
/// The enum doubles as the tag embedded in issued principals (the
/// `token_type` marker claim), so the refresh-token flow can re-dispatch
/// on the original grant kind with an exhaustive match instead of a string
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantType {
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "client_credentials")]
    ClientCredentials,
    #[serde(rename = "refresh_token")]
    RefreshToken,
    #[serde(rename = "authorization_code")]
    AuthorizationCode,
    #[serde(rename = "urn:ietf:params:oauth:grant-type:device_code")]
    DeviceCode,
}

impl GrantType {
    /// The wire name used in form bodies and marker claims.
    pub const fn as_str(self) -> &'static str {
        match self {
            GrantType::Password => "password",
            GrantType::ClientCredentials => "client_credentials",
            GrantType::RefreshToken => "refresh_token",
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::DeviceCode => "urn:ietf:params:oauth:grant-type:device_code",
        }
    }

    /// Parse a wire name; `None` for unsupported grant types.
    pub fn parse(value: &str) -> Option<GrantType> {
        match value {
            "password" => Some(GrantType::Password),
            "client_credentials" => Some(GrantType::ClientCredentials),
            "refresh_token" => Some(GrantType::RefreshToken),
            "authorization_code" => Some(GrantType::AuthorizationCode),
            "urn:ietf:params:oauth:grant-type:device_code" => Some(GrantType::DeviceCode),
            _ => None,
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed token request, immutable once constructed.
///
/// The opaque refresh-token/code payload of the wire request is resolved by
/// the authentication middleware upstream; flows that need the embedded
/// principal receive it alongside this request rather than through it.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub grant_type: GrantType,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Space-delimited scope string as presented by the client.
    pub scope: Option<String>,
}

impl TokenRequest {
    /// The requested scope string parsed into a set of scope tokens.
    pub fn scopes(&self) -> BTreeSet<String> {
        self.scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }
}
