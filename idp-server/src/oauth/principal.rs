//! Principals and the builder that assembles them

use crate::directory::{Account, Directory, DirectoryError};
use crate::oauth::assembler::ClaimAssembler;
use crate::oauth::claims::{kind, Claim};
use crate::oauth::destinations;
use crate::oauth::models::{GrantType, TokenRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A finished, destination-annotated claim bundle plus the granted scopes,
/// ready for the external token issuer.
///
/// Serializable so the issuer can embed it in refresh tokens and the
/// authentication middleware can hand it back on later requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub claims: Vec<Claim>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub scopes: BTreeSet<String>,
}

impl Principal {
    /// First claim of the given type, if any.
    pub fn claim(&self, claim_kind: &str) -> Option<&Claim> {
        self.claims.iter().find(|claim| claim.kind == claim_kind)
    }

    /// The subject identifier carried by this principal.
    pub fn subject(&self) -> Option<&str> {
        self.claim(kind::SUBJECT).map(|claim| claim.value.as_str())
    }

    /// The grant kind this principal originated from, read from the
    /// `token_type` marker claim.
    pub fn token_type(&self) -> Option<GrantType> {
        self.claim(kind::TOKEN_TYPE)
            .and_then(|claim| GrantType::parse(&claim.value))
    }
}

/// Assembles finished principals for the grant flows.
pub struct PrincipalBuilder {
    assembler: ClaimAssembler,
}

impl PrincipalBuilder {
    pub fn new(directory: Directory) -> Self {
        Self {
            assembler: ClaimAssembler::new(directory),
        }
    }

    /// Password-shaped principal: the account's canonical claims plus the
    /// requesting client and the `password` origin marker.
    ///
    /// Also used when a password-marked refresh token is redeemed, so the
    /// marker stays `password` across refreshes.
    pub async fn password_principal(
        &self,
        account: &Account,
        request: &TokenRequest,
    ) -> Result<Principal, DirectoryError> {
        let mut claims = self.assembler.assemble(account).await?;
        claims.push(Claim::new(kind::CLIENT_ID, &request.client_id));
        claims.push(Claim::new(kind::TOKEN_TYPE, GrantType::Password.as_str()));
        Ok(destinations::route(claims, request.scopes()))
    }

    /// Minimal principal for a client acting on its own behalf; the client
    /// id doubles as the subject.
    pub fn client_credentials_principal(&self, request: &TokenRequest) -> Principal {
        let claims = vec![
            Claim::new(kind::SUBJECT, &request.client_id),
            Claim::new(kind::CLIENT_ID, &request.client_id),
            Claim::new(kind::TOKEN_TYPE, GrantType::ClientCredentials.as_str()),
        ];
        destinations::route(claims, request.scopes())
    }
}
