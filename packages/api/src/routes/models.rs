use axum::Json;
use axum::extract::{Path, State};
use axum::{Router, routing::get};
use bloom_core::ModelInfo;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_models))
        .route("/{version}", get(model_info))
}

#[derive(Serialize, ToSchema)]
pub struct ModelsResponse {
    pub models: BTreeMap<String, ModelInfo>,
    pub active_model: String,
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/models",
    tag = "models",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Info for all loaded models", body = ModelsResponse),
        (status = 401, description = "Invalid or missing API key")
    )
)]
#[tracing::instrument(name = "GET /models", skip(state))]
pub async fn list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, ApiError> {
    Ok(Json(ModelsResponse {
        models: state.registry.all_info(),
        active_model: state.registry.active_version().to_string(),
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/models/{version}",
    tag = "models",
    params(("version" = String, Path, description = "Model version identifier")),
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Model information", body = ModelInfo),
        (status = 401, description = "Invalid or missing API key"),
        (status = 404, description = "Model version not loaded")
    )
)]
#[tracing::instrument(name = "GET /models/{version}", skip(state))]
pub async fn model_info(
    State(state): State<AppState>,
    Path(version): Path<String>,
) -> Result<Json<ModelInfo>, ApiError> {
    state
        .registry
        .info(&version)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("model version `{version}` not loaded")))
}
