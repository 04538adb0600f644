//! Grant dispatch and claims-principal construction
//!
//! The core of the token endpoint: given a parsed token request this module
//! decides which grant flow applies, gates it on the account's current
//! eligibility, and assembles a destination-annotated principal for the
//! external token issuer.
//!
//! ## Flow
//! 1. `dispatch` routes on the grant type (`password`, `client_credentials`,
//!    `refresh_token`, `authorization_code`, device code).
//! 2. `eligibility` runs the ordered account checks and owns the
//!    failure-counter side effects.
//! 3. `assembler` produces the canonical claim set for the account.
//! 4. `destinations` decides which issued token each claim may appear in.
//!
//! Refresh tokens re-enter the machine through the `token_type` marker
//! claim embedded in the previously issued principal.

pub mod assembler;
pub mod claims;
pub mod destinations;
pub mod dispatch;
pub mod eligibility;
pub mod models;
pub mod principal;
