//! Account eligibility validation
//!
//! The gate every account-backed grant flow passes through before any
//! claims are assembled. Checks run in a fixed order with early exit; each
//! check assumes the prior one passed. All outcomes are values; nothing
//! escapes this component except directory infrastructure failures.

use crate::directory::{Account, AccountDirectory, Directory, DirectoryError};
use crate::oauth::models::TokenRequest;
use log::debug;
use std::fmt;

/// Why an account may not receive tokens right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    NotFound,
    SignInNotAllowed,
    LockedOut,
    InvalidCredentials,
}

impl RejectionReason {
    /// Protocol-level description returned to the client.
    pub const fn description(self) -> &'static str {
        match self {
            RejectionReason::NotFound => "The token is no longer valid.",
            RejectionReason::SignInNotAllowed => "The user is no longer allowed to sign in.",
            RejectionReason::LockedOut => "The user is already locked out.",
            RejectionReason::InvalidCredentials => "The credentials are invalid.",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Outcome of eligibility validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Rejected(RejectionReason),
}

/// Snapshot checks evaluated in order; the first rejecting predicate wins.
///
/// Ordering is contractual: an account that is both sign-in-disabled and
/// locked out is rejected as sign-in-disabled.
pub(crate) const SNAPSHOT_CHECKS: &[(fn(&Account) -> bool, RejectionReason)] = &[
    (
        |account| !account.sign_in_allowed,
        RejectionReason::SignInNotAllowed,
    ),
    (
        |account| account.lockout_enabled && account.locked_out,
        RejectionReason::LockedOut,
    ),
];

/// Runs the ordered eligibility checks for one account snapshot.
pub struct EligibilityValidator {
    directory: Directory,
}

impl EligibilityValidator {
    pub fn new(directory: Directory) -> Self {
        Self { directory }
    }

    /// Validate an account's eligibility to receive tokens.
    ///
    /// The credential check runs whenever the request presents a password;
    /// a failed check counts towards lockout. Success resets the failure
    /// counter for lockout-enabled accounts. That reset is an explicit side
    /// effect and not safe to skip.
    pub async fn validate(
        &self,
        account: Option<&Account>,
        request: &TokenRequest,
    ) -> Result<Eligibility, DirectoryError> {
        let Some(account) = account else {
            return Ok(Eligibility::Rejected(RejectionReason::NotFound));
        };

        for (rejects, reason) in SNAPSHOT_CHECKS {
            if rejects(account) {
                debug!("Account '{}' rejected: {:?}", account.id, reason);
                return Ok(Eligibility::Rejected(*reason));
            }
        }

        if let Some(password) = request.password.as_deref() {
            if !self.directory.verify_password(&account.id, password).await? {
                if account.lockout_enabled {
                    self.directory.record_failed_attempt(&account.id).await?;
                }
                debug!("Credential check failed for account '{}'", account.id);
                return Ok(Eligibility::Rejected(RejectionReason::InvalidCredentials));
            }
        }

        if account.lockout_enabled {
            self.directory.reset_failure_count(&account.id).await?;
        }

        Ok(Eligibility::Eligible)
    }
}
