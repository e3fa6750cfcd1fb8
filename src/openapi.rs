use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health,
        api::generate_cert,
    ),
    components(
        schemas(api::HealthResponse, api::GenerateCertForm)
    ),
    tags(
        (name = "certgen", description = "Certificate generator backend API")
    )
)]
pub struct ApiDoc;
