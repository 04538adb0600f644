//! Grant dispatch: routing token requests to their flows
//!
//! A pure routing function executed once per request. The refresh-token
//! flow is the only one that re-enters the machine: it reads the grant kind
//! the presented token originated from and re-runs that flow. No partial
//! principal ever escapes; a flow either finishes or returns an error.

use crate::directory::{Account, AccountDirectory, Directory, DirectoryError};
use crate::oauth::eligibility::{Eligibility, EligibilityValidator, RejectionReason};
use crate::oauth::models::{GrantType, TokenRequest};
use crate::oauth::principal::{Principal, PrincipalBuilder};
use log::{debug, info};
use thiserror::Error;

/// Terminal outcomes of a failed dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required parameter was missing; no directory lookup was attempted.
    #[error("the {0} parameter is required")]
    Malformed(&'static str),
    /// The account may not receive tokens; carries the specific reason.
    #[error("{0}")]
    Rejected(RejectionReason),
    /// The refresh token's embedded marker was missing or unrecognized.
    #[error("Authentication scheme is not found")]
    SchemeNotFound,
    /// No authenticated principal accompanied a grant that requires one.
    #[error("no authenticated principal accompanied the request")]
    MissingAuthentication,
    /// Directory infrastructure failure; distinct from account rejection.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Routes a token request to the flow its grant type demands.
pub struct GrantDispatcher {
    directory: Directory,
    validator: EligibilityValidator,
    builder: PrincipalBuilder,
}

impl GrantDispatcher {
    pub fn new(directory: Directory) -> Self {
        Self {
            validator: EligibilityValidator::new(directory.clone()),
            builder: PrincipalBuilder::new(directory.clone()),
            directory,
        }
    }

    /// Dispatch one token request.
    ///
    /// `authenticated` is the principal the upstream middleware recovered
    /// from the presented refresh token, authorization code, or device
    /// code; flows that do not present a token ignore it.
    pub async fn dispatch(
        &self,
        request: &TokenRequest,
        authenticated: Option<&Principal>,
    ) -> Result<Principal, DispatchError> {
        match request.grant_type {
            GrantType::Password => self.password_grant(request).await,
            GrantType::ClientCredentials => self.client_credentials_grant(request),
            GrantType::RefreshToken => self.refresh_token_grant(request, authenticated).await,
            GrantType::AuthorizationCode | GrantType::DeviceCode => {
                let principal = authenticated
                    .cloned()
                    .ok_or(DispatchError::MissingAuthentication)?;
                debug!(
                    "Forwarding principal authenticated upstream for {} grant",
                    request.grant_type
                );
                Ok(principal)
            }
        }
    }

    async fn password_grant(&self, request: &TokenRequest) -> Result<Principal, DispatchError> {
        let username = request
            .username
            .as_deref()
            .filter(|username| !username.is_empty())
            .ok_or(DispatchError::Malformed("username"))?;
        if request.password.as_deref().is_none_or(str::is_empty) {
            return Err(DispatchError::Malformed("password"));
        }

        let account = self.directory.find_by_username(username).await?;
        self.issue_for_account(account.as_ref(), request).await
    }

    fn client_credentials_grant(&self, request: &TokenRequest) -> Result<Principal, DispatchError> {
        if request.client_id.is_empty() {
            return Err(DispatchError::Malformed("client_id"));
        }
        Ok(self.builder.client_credentials_principal(request))
    }

    async fn refresh_token_grant(
        &self,
        request: &TokenRequest,
        authenticated: Option<&Principal>,
    ) -> Result<Principal, DispatchError> {
        let Some(source) = authenticated else {
            return Err(DispatchError::SchemeNotFound);
        };

        match source.token_type() {
            Some(GrantType::ClientCredentials) => {
                info!("Refresh token re-dispatched as client credentials");
                self.client_credentials_grant(request)
            }
            Some(GrantType::Password) => {
                info!("Refresh token re-dispatched as password");
                let subject = source
                    .subject()
                    .ok_or(DispatchError::Rejected(RejectionReason::NotFound))?;
                let account = self.directory.find_by_id(subject).await?;
                self.issue_for_account(account.as_ref(), request).await
            }
            _ => Err(DispatchError::SchemeNotFound),
        }
    }

    /// Eligibility gate shared by the password grant and the
    /// password-marked refresh path.
    async fn issue_for_account(
        &self,
        account: Option<&Account>,
        request: &TokenRequest,
    ) -> Result<Principal, DispatchError> {
        match (self.validator.validate(account, request).await?, account) {
            (Eligibility::Rejected(reason), _) => Err(DispatchError::Rejected(reason)),
            (Eligibility::Eligible, Some(account)) => {
                Ok(self.builder.password_principal(account, request).await?)
            }
            (Eligibility::Eligible, None) => {
                Err(DispatchError::Rejected(RejectionReason::NotFound))
            }
        }
    }
}
