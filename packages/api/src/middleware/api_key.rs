use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::middleware::API_KEY_HEADER;
use crate::state::AppState;
use crate::unauthorized;

/// Rejects requests whose `x-api-key` header does not match the configured
/// key. Applied to every route except the health check.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == state.api_key => Ok(next.run(request).await),
        _ => Err(unauthorized!("Invalid or missing API key")),
    }
}
