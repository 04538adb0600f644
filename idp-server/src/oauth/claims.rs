//! Claims and token destinations

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Claim type names shared with the external token issuer.
pub mod kind {
    pub const SUBJECT: &str = "sub";
    pub const NAME: &str = "name";
    pub const GIVEN_NAME: &str = "given_name";
    pub const FAMILY_NAME: &str = "family_name";
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";
    pub const CLIENT_ID: &str = "client_id";
    pub const TOKEN_TYPE: &str = "token_type";
    pub const SCOPE: &str = "scope";
}

/// Which issued token a claim is permitted to appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    AccessToken,
    IdentityToken,
}

/// A single (type, value) fact about an identity.
///
/// A claim with an empty destination set is computed internally but never
/// emitted to any token; the serialized form omits the field entirely so
/// the issuer cannot mistake it for an emittable claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub destinations: BTreeSet<Destination>,
}

impl Claim {
    /// A claim with no destinations assigned yet.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            destinations: BTreeSet::new(),
        }
    }

    /// Whether the claim will appear in at least one issued token.
    pub fn is_emitted(&self) -> bool {
        !self.destinations.is_empty()
    }
}
