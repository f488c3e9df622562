use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::routes;

/// Adds the API-key security scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "bloom model API",
        description = "Iris classifier serving API: versioned model artifacts behind a prediction endpoint."
    ),
    paths(
        routes::health::health,
        routes::predict::predict,
        routes::models::list_models,
        routes::models::model_info,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::predict::PredictRequest,
        routes::predict::PredictResponse,
        routes::models::ModelsResponse,
        bloom_core::ModelInfo,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "monitoring", description = "Health checks"),
        (name = "predictions", description = "Model inference"),
        (name = "models", description = "Loaded model information")
    )
)]
pub struct ApiDoc;
