//! Canonical claim assembly for an account

use crate::directory::{Account, AccountDirectory, Directory, DirectoryError};
use crate::oauth::claims::{kind, Claim};

/// Builds the canonical claim set for an account, with no OAuth semantics
/// and no destinations assigned.
pub struct ClaimAssembler {
    directory: Directory,
}

impl ClaimAssembler {
    pub fn new(directory: Directory) -> Self {
        Self { directory }
    }

    /// Claims in contract order: subject, name, given name, surname, email,
    /// then one role claim per directory role in directory order.
    pub async fn assemble(&self, account: &Account) -> Result<Vec<Claim>, DirectoryError> {
        let mut claims = vec![
            Claim::new(kind::SUBJECT, &account.id),
            Claim::new(kind::NAME, &account.username),
        ];

        if let Some(given_name) = &account.given_name {
            claims.push(Claim::new(kind::GIVEN_NAME, given_name));
        }
        if let Some(family_name) = &account.family_name {
            claims.push(Claim::new(kind::FAMILY_NAME, family_name));
        }
        if let Some(email) = &account.email {
            claims.push(Claim::new(kind::EMAIL, email));
        }

        for role in self.directory.roles(&account.id).await? {
            claims.push(Claim::new(kind::ROLE, role));
        }

        Ok(claims)
    }
}
