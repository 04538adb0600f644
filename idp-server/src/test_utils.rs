use crate::api::models::AuthenticatedPrincipal;
use crate::config::IdpConfig;
use crate::create_app;
use crate::directory::memory::InMemoryDirectory;
use crate::directory::{Account, Directory};
use crate::issuer::IssuerClient;
use crate::oauth::principal::Principal;
use crate::state::AppState;
use axum::body::Body;
use axum::{Extension, Router};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use url::form_urlencoded;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test fixture wiring the full application with an in-memory account
/// directory and a mocked token issuer.
///
/// The directory handle is shared with the application state, so tests can
/// seed accounts and inspect failure counters directly while requests flow
/// through the real router.
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Directory backend shared with the application state
    pub directory: InMemoryDirectory,
    /// Mock server standing in for the token issuer
    pub issuer_mock: MockServer,
}

impl TestFixture {
    pub async fn new() -> Self {
        // Initialize test logger
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let issuer_mock = MockServer::start().await;
        let directory = InMemoryDirectory::new();

        let issuer = IssuerClient::new(reqwest::Client::new(), &issuer_mock.uri())
            .expect("Failed to create issuer client");
        let state = AppState {
            config: Arc::new(IdpConfig::default()),
            directory: Directory::InMemory(directory.clone()),
            issuer,
        };

        Self {
            app: create_app(state).await,
            directory,
            issuer_mock,
        }
    }

    /// Mount a successful issuer response for principal signing.
    pub async fn mock_issuer_success(&self) {
        Mock::given(method("POST"))
            .and(path("/v1/tokens/sign"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-access-token",
                "token_type": "Bearer",
                "expires_in": 3600,
                "scope": "orders.read",
                "refresh_token": "test-refresh-token"
            })))
            .mount(&self.issuer_mock)
            .await;
    }

    /// The principal the issuer was asked to sign in the only recorded call.
    pub async fn signed_principal(&self) -> Principal {
        let requests = self
            .issuer_mock
            .received_requests()
            .await
            .expect("Request recording should be enabled");
        assert_eq!(requests.len(), 1, "Expected exactly one issuer call");
        let body: serde_json::Value =
            serde_json::from_slice(&requests[0].body).expect("Issuer body should be JSON");
        serde_json::from_value(body["principal"].clone()).expect("Body should carry a principal")
    }

    /// Seed a default, eligible account with the `Client` role.
    pub async fn seed_account(&self, account: Account, password: &str) {
        self.directory.insert(account, Some(password), &["Client"]).await;
    }

    /// Send a form-encoded POST request to the application.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        Self::send(self.app.clone(), uri, fields).await
    }

    /// Send a form-encoded POST accompanied by a principal the upstream
    /// authentication middleware would have recovered.
    pub async fn post_form_as(
        &self,
        principal: Principal,
        uri: &str,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let app = self
            .app
            .clone()
            .layer(Extension(AuthenticatedPrincipal(principal)));
        Self::send(app, uri, fields).await
    }

    /// Send a GET request to the application.
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        Self::into_test_response(
            self.app
                .clone()
                .oneshot(request)
                .await
                .expect("Request should complete"),
        )
        .await
    }

    async fn send(app: Router, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(fields);
        let body = serializer.finish();

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Failed to build request");

        Self::into_test_response(app.oneshot(request).await.expect("Request should complete"))
            .await
    }

    async fn into_test_response(response: axum::response::Response) -> TestResponse {
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();
        TestResponse { status, body }
    }
}

/// A buffered response with assertion helpers.
pub struct TestResponse {
    pub status: StatusCode,
    body: Vec<u8>,
}

impl TestResponse {
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Unexpected status; body: {}",
            String::from_utf8_lossy(&self.body)
        );
    }

    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Response body should deserialize")
    }
}
