use bloom_core::ModelRegistry;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use std::time::Duration;

pub type AppState = Arc<State>;

/// Shared server state. The registry is immutable after startup, so request
/// handlers share it without locking.
pub struct State {
    pub registry: Arc<ModelRegistry>,
    pub api_key: String,
    pub rate_limit_per_minute: u32,
    /// Fixed-window request counters per caller; entries expire with the
    /// window.
    pub rate_windows: moka::sync::Cache<String, Arc<AtomicU32>>,
    pub started_at: DateTime<Utc>,
}

impl State {
    pub fn new(registry: Arc<ModelRegistry>, api_key: String, rate_limit_per_minute: u32) -> Self {
        Self {
            registry,
            api_key,
            rate_limit_per_minute,
            rate_windows: moka::sync::Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(60))
                .build(),
            started_at: Utc::now(),
        }
    }
}
