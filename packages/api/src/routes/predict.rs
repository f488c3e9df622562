use axum::Json;
use axum::extract::State;
use axum::{Router, routing::post};
use bloom_core::validation::validate_features;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(predict))
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PredictRequest {
    /// Feature record: one numeric value per feature the model requires,
    /// e.g. `{"sepal_length": 5.1, "sepal_width": 3.5, "petal_length": 1.4, "petal_width": 0.2}`
    #[schema(value_type = Object)]
    pub features: Map<String, Value>,
    /// Model version to use; defaults to the active version
    pub model_version: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PredictResponse {
    /// Predicted class name
    pub prediction: String,
    /// Fraction of the ensemble voting for the winning class, in [0, 1]
    pub confidence: f64,
    pub model_version: String,
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/predict",
    tag = "predictions",
    request_body = PredictRequest,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Prediction result", body = PredictResponse),
        (status = 400, description = "Missing or malformed feature, or unknown model version"),
        (status = 401, description = "Invalid or missing API key"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Model invocation failed")
    )
)]
#[tracing::instrument(name = "POST /predict", skip(state, payload))]
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let artifact = state.registry.resolve(payload.model_version.as_deref())?;
    let vector = validate_features(&payload.features, &artifact.meta.feature_names)?;
    let prediction = artifact.predict(&vector)?;

    tracing::info!(
        version = %artifact.meta.version,
        label = %prediction.label,
        confidence = prediction.confidence,
        "Prediction successful"
    );
    Ok(Json(PredictResponse {
        prediction: prediction.label,
        confidence: prediction.confidence,
        model_version: artifact.meta.version.clone(),
        timestamp: Utc::now(),
    }))
}
