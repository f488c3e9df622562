#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use bloom_api::{State, construct_router};
use bloom_core::ModelRegistry;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting bloom model API service");

    let config = config::Config::from_env()?;
    let registry = ModelRegistry::load_dir(&config.models_dir, &config.active_version)?;
    if registry.is_empty() {
        tracing::warn!(
            dir = %config.models_dir.display(),
            "No model artifacts found. Run the trainer first; /predict will fail until then."
        );
    } else {
        tracing::info!(
            loaded = ?registry.loaded_versions(),
            active = %registry.active_version(),
            "Model registry ready"
        );
    }

    let state = Arc::new(State::new(
        Arc::new(registry),
        config.api_key.clone(),
        config.rate_limit_per_minute,
    ));
    let app = construct_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
