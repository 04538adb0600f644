//! Health check endpoints

use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

/// Basic health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    status: &'static str,
    #[serde(skip)]
    status_code: StatusCode,
}

impl IntoResponse for Health {
    fn into_response(self) -> Response {
        (self.status_code, Json(serde_json::json!({ "status": self.status }))).into_response()
    }
}

/// Liveness check handler
#[utoipa::path(
    get,
    path = "/healthy",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = Health)
    )
)]
pub(crate) async fn health_check() -> impl IntoResponse {
    Health {
        status: "ok",
        status_code: StatusCode::OK,
    }
}

/// Readiness check handler; verifies the collaborators are reachable
#[utoipa::path(
    get,
    path = "/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = Health),
        (status = 503, description = "Service is not ready", body = Health)
    )
)]
pub(crate) async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.health_check().await {
        Health {
            status: "ok",
            status_code: StatusCode::OK,
        }
    } else {
        Health {
            status: "unavailable",
            status_code: StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Creates the health check routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthy", get(health_check))
        .route("/ready", get(ready_check))
}
