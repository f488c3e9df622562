use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::ApiError;
use crate::middleware::API_KEY_HEADER;
use crate::state::AppState;

/// Fixed-window rate limit keyed by API key. The counter entry expires with
/// the cache TTL, which starts a fresh window.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();

    let counter = state
        .rate_windows
        .get_with(caller, || Arc::new(AtomicU32::new(0)));
    let used = counter.fetch_add(1, Ordering::Relaxed);
    if used >= state.rate_limit_per_minute {
        return Err(ApiError::too_many_requests(format!(
            "Rate limit exceeded: {} requests per minute",
            state.rate_limit_per_minute
        )));
    }

    Ok(next.run(request).await)
}
