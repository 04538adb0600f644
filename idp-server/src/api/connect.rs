//! Token endpoint handler (RFC 6749)

use crate::api::models::{AuthenticatedPrincipal, OAuthError, TokenRequestForm};
use crate::issuer::TokenResponse;
use crate::oauth::dispatch::{DispatchError, GrantDispatcher};
use crate::oauth::models::{GrantType, TokenRequest};
use crate::openapi::CONNECT_TAG;
use crate::state::AppState;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use log::{error, info, warn};

/// Creates the token endpoint routes
pub fn router() -> Router<AppState> {
    Router::new().route("/connect/token", post(token))
}

/// OAuth 2.0 Token endpoint (RFC 6749 Section 3.2)
///
/// Dispatches the request to the grant flow it names, builds the
/// claims-principal, and relays the token material minted by the issuer.
#[utoipa::path(
    post,
    path = "/connect/token",
    request_body(
        content = TokenRequestForm,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Tokens issued successfully", body = TokenResponse),
        (status = 400, description = "Malformed or rejected request", body = OAuthError),
        (status = 502, description = "A collaborator service is unavailable", body = OAuthError)
    ),
    tag = CONNECT_TAG
)]
pub(crate) async fn token(
    State(state): State<AppState>,
    authenticated: Option<Extension<AuthenticatedPrincipal>>,
    Form(form): Form<TokenRequestForm>,
) -> Response {
    let Some(grant_type) = form.grant_type.as_deref() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            OAuthError::invalid_request("the grant_type parameter is required"),
        );
    };
    let Some(grant_type) = GrantType::parse(grant_type) else {
        warn!("Unsupported grant type '{}'", grant_type);
        return error_response(StatusCode::BAD_REQUEST, OAuthError::unsupported_grant_type());
    };

    let client_id = match form.client_id.as_deref() {
        Some(client_id) if !client_id.is_empty() => client_id.to_string(),
        _ => {
            warn!("Missing client_id in token request");
            return error_response(
                StatusCode::BAD_REQUEST,
                OAuthError::invalid_request("the client_id parameter is required"),
            );
        }
    };

    if let Some(parameter) = form.missing_parameter(grant_type) {
        warn!(
            "Missing {} in {} token request from client '{}'",
            parameter, grant_type, client_id
        );
        return error_response(
            StatusCode::BAD_REQUEST,
            OAuthError::invalid_request(&format!("the {parameter} parameter is required")),
        );
    }

    info!(
        "Token request from client '{}' with grant type '{}'",
        client_id, grant_type
    );

    let request = TokenRequest {
        grant_type,
        client_id,
        username: form.username,
        password: form.password,
        scope: form.scope,
    };

    let dispatcher = GrantDispatcher::new(state.directory.clone());
    let principal = match dispatcher
        .dispatch(
            &request,
            authenticated.as_ref().map(|Extension(principal)| &principal.0),
        )
        .await
    {
        Ok(principal) => principal,
        Err(e) => return denial(&request, e),
    };

    match state.issuer.sign(&principal).await {
        Ok(tokens) => {
            info!(
                "Issued tokens to client '{}' via {} grant",
                request.client_id, request.grant_type
            );
            Json(tokens).into_response()
        }
        Err(e) => {
            error!("Token issuer request failed: {}", e);
            error_response(
                StatusCode::BAD_GATEWAY,
                OAuthError::server_error("The token issuer is unavailable"),
            )
        }
    }
}

/// Map a dispatch failure to the protocol-level denial it warrants.
fn denial(request: &TokenRequest, err: DispatchError) -> Response {
    match err {
        DispatchError::Malformed(parameter) => {
            warn!(
                "Malformed {} token request from client '{}': missing {}",
                request.grant_type, request.client_id, parameter
            );
            error_response(
                StatusCode::BAD_REQUEST,
                OAuthError::invalid_request(&format!("the {parameter} parameter is required")),
            )
        }
        DispatchError::MissingAuthentication => error_response(
            StatusCode::BAD_REQUEST,
            OAuthError::invalid_request("no authenticated principal accompanied the request"),
        ),
        DispatchError::Rejected(reason) => {
            info!(
                "Rejected {} token request from client '{}': {:?}",
                request.grant_type, request.client_id, reason
            );
            error_response(
                StatusCode::BAD_REQUEST,
                OAuthError::invalid_grant(reason.description()),
            )
        }
        DispatchError::SchemeNotFound => {
            warn!(
                "Refresh token with unrecognized origin from client '{}'",
                request.client_id
            );
            error_response(
                StatusCode::BAD_REQUEST,
                OAuthError::invalid_grant("Authentication scheme is not found"),
            )
        }
        DispatchError::Directory(e) => {
            error!("Account directory request failed: {}", e);
            error_response(
                StatusCode::BAD_GATEWAY,
                OAuthError::server_error("The account directory is unavailable"),
            )
        }
    }
}

/// Helper function to create error responses
fn error_response(status: StatusCode, error: OAuthError) -> Response {
    (status, Json(error)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Account, Directory};
    use crate::oauth::claims::{kind, Destination};
    use crate::oauth::principal::{Principal, PrincipalBuilder};
    use crate::test_utils::TestFixture;
    use std::collections::BTreeSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn alice() -> Account {
        Account {
            id: "alice-id".to_string(),
            username: "alice".to_string(),
            given_name: None,
            family_name: None,
            email: None,
            sign_in_allowed: true,
            lockout_enabled: true,
            locked_out: false,
        }
    }

    fn client_credentials_principal(client_id: &str) -> Principal {
        let builder = PrincipalBuilder::new(Directory::InMemory(
            crate::directory::memory::InMemoryDirectory::new(),
        ));
        builder.client_credentials_principal(&TokenRequest {
            grant_type: GrantType::ClientCredentials,
            client_id: client_id.to_string(),
            username: None,
            password: None,
            scope: None,
        })
    }

    #[tokio::test]
    async fn test_unsupported_grant_type_is_refused() {
        let fixture = TestFixture::new().await;

        let response = fixture
            .post_form(
                "/connect/token",
                &[("grant_type", "implicit"), ("client_id", "web-client")],
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error: OAuthError = response.json_as();
        assert_eq!(error.error, "unsupported_grant_type");
    }

    #[tokio::test]
    async fn test_missing_grant_type_is_invalid_request() {
        let fixture = TestFixture::new().await;

        let response = fixture
            .post_form("/connect/token", &[("client_id", "web-client")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error: OAuthError = response.json_as();
        assert_eq!(error.error, "invalid_request");
    }

    #[tokio::test]
    async fn test_missing_client_id_is_invalid_request() {
        let fixture = TestFixture::new().await;

        let response = fixture
            .post_form("/connect/token", &[("grant_type", "password")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error: OAuthError = response.json_as();
        assert_eq!(error.error, "invalid_request");
    }

    #[tokio::test]
    async fn test_password_grant_issues_tokens() {
        let fixture = TestFixture::new().await;
        fixture.seed_account(alice(), "secret").await;
        fixture.mock_issuer_success().await;

        let response = fixture
            .post_form(
                "/connect/token",
                &[
                    ("grant_type", "password"),
                    ("client_id", "web-client"),
                    ("username", "alice"),
                    ("password", "secret"),
                    ("scope", "orders.read"),
                ],
            )
            .await;

        response.assert_status(StatusCode::OK);
        let tokens: TokenResponse = response.json_as();
        assert_eq!(tokens.access_token, "test-access-token");
        assert_eq!(tokens.token_type, "Bearer");

        let principal = fixture.signed_principal().await;
        let summary: Vec<(&str, &str)> = principal
            .claims
            .iter()
            .map(|claim| (claim.kind.as_str(), claim.value.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (kind::SUBJECT, "alice-id"),
                (kind::NAME, "alice"),
                (kind::ROLE, "Client"),
                (kind::CLIENT_ID, "web-client"),
                (kind::TOKEN_TYPE, "password"),
                (kind::SCOPE, "orders.read"),
            ]
        );
        let marker = principal.claim(kind::TOKEN_TYPE).expect("Marker expected");
        assert!(marker.destinations.is_empty());
        let scope = principal.claim(kind::SCOPE).expect("Scope claim expected");
        assert_eq!(scope.destinations, BTreeSet::from([Destination::AccessToken]));
    }

    #[tokio::test]
    async fn test_password_grant_with_bad_credentials_is_invalid_grant() {
        let fixture = TestFixture::new().await;
        fixture.seed_account(alice(), "secret").await;

        let response = fixture
            .post_form(
                "/connect/token",
                &[
                    ("grant_type", "password"),
                    ("client_id", "web-client"),
                    ("username", "alice"),
                    ("password", "wrong"),
                ],
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error: OAuthError = response.json_as();
        assert_eq!(error.error, "invalid_grant");
        assert_eq!(
            error.error_description.as_deref(),
            Some("The credentials are invalid.")
        );
        assert_eq!(fixture.directory.failed_attempts("alice-id").await, Some(1));
    }

    #[tokio::test]
    async fn test_locked_out_account_cannot_obtain_tokens() {
        let fixture = TestFixture::new().await;
        fixture
            .seed_account(
                Account {
                    locked_out: true,
                    ..alice()
                },
                "secret",
            )
            .await;

        let response = fixture
            .post_form(
                "/connect/token",
                &[
                    ("grant_type", "password"),
                    ("client_id", "web-client"),
                    ("username", "alice"),
                    ("password", "secret"),
                ],
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error: OAuthError = response.json_as();
        assert_eq!(error.error, "invalid_grant");
        assert_eq!(
            error.error_description.as_deref(),
            Some("The user is already locked out.")
        );
        assert_eq!(fixture.directory.failed_attempts("alice-id").await, Some(0));
    }

    #[tokio::test]
    async fn test_refresh_grant_requires_the_refresh_token_parameter() {
        let fixture = TestFixture::new().await;

        let response = fixture
            .post_form(
                "/connect/token",
                &[("grant_type", "refresh_token"), ("client_id", "web-client")],
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error: OAuthError = response.json_as();
        assert_eq!(error.error, "invalid_request");
    }

    #[tokio::test]
    async fn test_refresh_of_client_credentials_keeps_its_shape() {
        let fixture = TestFixture::new().await;
        fixture.mock_issuer_success().await;

        let response = fixture
            .post_form_as(
                client_credentials_principal("service-42"),
                "/connect/token",
                &[
                    ("grant_type", "refresh_token"),
                    ("client_id", "service-42"),
                    ("refresh_token", "opaque-refresh-token"),
                ],
            )
            .await;

        response.assert_status(StatusCode::OK);
        let principal = fixture.signed_principal().await;
        assert_eq!(principal.subject(), Some("service-42"));
        assert_eq!(principal.token_type(), Some(GrantType::ClientCredentials));
        assert!(principal.claim(kind::NAME).is_none());
    }

    #[tokio::test]
    async fn test_refresh_with_unrecognized_origin_finds_no_scheme() {
        let fixture = TestFixture::new().await;

        let response = fixture
            .post_form_as(
                Principal::default(),
                "/connect/token",
                &[
                    ("grant_type", "refresh_token"),
                    ("client_id", "web-client"),
                    ("refresh_token", "opaque-refresh-token"),
                ],
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error: OAuthError = response.json_as();
        assert_eq!(error.error, "invalid_grant");
        assert_eq!(
            error.error_description.as_deref(),
            Some("Authentication scheme is not found")
        );
    }

    #[tokio::test]
    async fn test_authorization_code_grant_forwards_the_upstream_principal() {
        let fixture = TestFixture::new().await;
        fixture.mock_issuer_success().await;
        let upstream = client_credentials_principal("web-client");

        let response = fixture
            .post_form_as(
                upstream.clone(),
                "/connect/token",
                &[
                    ("grant_type", "authorization_code"),
                    ("client_id", "web-client"),
                    ("code", "opaque-code"),
                ],
            )
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(fixture.signed_principal().await, upstream);
    }

    #[tokio::test]
    async fn test_issuer_outage_is_a_bad_gateway_not_invalid_grant() {
        let fixture = TestFixture::new().await;
        fixture.seed_account(alice(), "secret").await;
        Mock::given(method("POST"))
            .and(path("/v1/tokens/sign"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&fixture.issuer_mock)
            .await;

        let response = fixture
            .post_form(
                "/connect/token",
                &[
                    ("grant_type", "password"),
                    ("client_id", "web-client"),
                    ("username", "alice"),
                    ("password", "secret"),
                ],
            )
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let error: OAuthError = response.json_as();
        assert_eq!(error.error, "server_error");
    }
}
