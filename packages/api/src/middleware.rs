pub mod api_key;
pub mod rate_limit;

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";
