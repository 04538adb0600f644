//! Destination routing: the access/identity token split
//!
//! The entire access/identity routing policy lives in this module. Every
//! claim defaults to the identity token; only the claim types a resource
//! server needs also reach the access token, and scopes reach the access
//! token exclusively. The `token_type` marker exists purely to drive
//! refresh-token re-dispatch and must never be emitted anywhere.

use crate::oauth::claims::{kind, Claim, Destination};
use crate::oauth::principal::Principal;
use std::collections::BTreeSet;

/// Destinations a claim of the given type may be emitted to.
fn destinations_for(claim_kind: &str) -> &'static [Destination] {
    match claim_kind {
        kind::TOKEN_TYPE => &[],
        kind::SCOPE => &[Destination::AccessToken],
        kind::SUBJECT | kind::ROLE => &[Destination::AccessToken, Destination::IdentityToken],
        _ => &[Destination::IdentityToken],
    }
}

/// Assign destinations to every claim and finish the principal.
///
/// When the granted scope set is non-empty a single `scope` claim is
/// appended, destined for the access token only. Pure: routing the same
/// claims and scopes twice yields identical assignments.
pub fn route(mut claims: Vec<Claim>, scopes: BTreeSet<String>) -> Principal {
    if !scopes.is_empty() {
        let joined = scopes.iter().cloned().collect::<Vec<_>>().join(" ");
        claims.push(Claim::new(kind::SCOPE, joined));
    }

    for claim in &mut claims {
        claim.destinations = destinations_for(&claim.kind).iter().copied().collect();
    }

    Principal { claims, scopes }
}
