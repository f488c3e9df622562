use axum::Json;
use axum::extract::State;
use axum::{Router, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(health))
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` when at least one model artifact is loaded, else `degraded`
    pub status: String,
    pub models_loaded: Vec<String>,
    pub active_model: String,
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "monitoring",
    responses(
        (status = 200, description = "Service health and loaded model versions", body = HealthResponse)
    )
)]
#[tracing::instrument(name = "GET /health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let status = if state.registry.is_empty() {
        "degraded"
    } else {
        "healthy"
    };
    Ok(Json(HealthResponse {
        status: status.to_string(),
        models_loaded: state.registry.loaded_versions(),
        active_model: state.registry.active_version().to_string(),
        timestamp: Utc::now(),
    }))
}
