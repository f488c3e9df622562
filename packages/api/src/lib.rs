//! HTTP layer for the bloom model service: router assembly, request
//! handlers, API-key auth, and per-caller rate limiting.

use axum::{Router, middleware::from_fn_with_state};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
mod middleware;
mod openapi;
pub mod routes;
pub mod state;

pub use axum;
pub use state::{AppState, State};

use middleware::api_key::api_key_middleware;
use middleware::rate_limit::rate_limit_middleware;

/// Builds the full application router.
///
/// `/health` is open; `/predict` and `/models` require the API key, and
/// `/predict` is additionally rate limited per caller.
pub fn construct_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest(
            "/predict",
            routes::predict::routes()
                .layer(from_fn_with_state(state.clone(), rate_limit_middleware)),
        )
        .nest("/models", routes::models::routes())
        .layer(from_fn_with_state(state.clone(), api_key_middleware));

    Router::new()
        .nest("/health", routes::health::routes())
        .merge(protected)
        .with_state(state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
}
