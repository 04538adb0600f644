use utoipa::OpenApi;

pub(crate) const CONNECT_TAG: &str = "Connect API";
pub(crate) const HEALTH_TAG: &str = "Health API";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = CONNECT_TAG, description = "OAuth 2.0 / OpenID Connect token endpoint"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    ),
    paths(
        crate::api::connect::token,
        crate::api::health::health_check,
        crate::api::health::ready_check,
    ),
    info(
        title = "Identity Token Endpoint",
        description = "Grant dispatch and claims-principal construction microservice",
        version = "1.0.0"
    )
)]
pub(crate) struct ApiDoc;
