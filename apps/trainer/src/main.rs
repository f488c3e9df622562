use bloom_core::dataset;
use bloom_core::registry::artifact_file_name;
use bloom_core::training::{self, TrainOptions};
use bloom_core::{ModelArtifact, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let models_dir: PathBuf = env::var("MODELS_DIR")
        .unwrap_or_else(|_| "models".to_string())
        .into();
    let opts = TrainOptions {
        version: env::var("MODEL_VERSION").unwrap_or_else(|_| "v1".to_string()),
        ..TrainOptions::default()
    };

    tracing::info!(version = %opts.version, "Starting model training");
    let data = dataset::iris();
    tracing::info!(
        dataset = %data.name,
        rows = data.len(),
        features = data.feature_names.len(),
        classes = data.target_names.len(),
        "Loaded dataset"
    );

    let (artifact, metadata) = training::train(&data, &opts)?;
    tracing::info!(
        accuracy = metadata.meta.accuracy,
        precision = metadata.confusion_matrix.precision,
        recall = metadata.confusion_matrix.recall,
        f1 = metadata.confusion_matrix.f1_score,
        train_size = metadata.meta.train_size,
        test_size = metadata.meta.test_size,
        "Holdout evaluation"
    );

    fs::create_dir_all(&models_dir)?;
    let model_path = models_dir.join(artifact_file_name(&opts.version));
    artifact.save(&model_path)?;

    let metadata_path = models_dir.join(format!("training_metadata_{}.json", opts.version));
    fs::write(&metadata_path, serde_json::to_vec_pretty(&metadata)?)?;
    tracing::info!(path = %metadata_path.display(), "Saved training metadata");

    verify_artifact(&model_path)?;
    tracing::info!("Model training completed successfully");
    Ok(())
}

/// Reloads the saved artifact and runs one sample prediction, so a broken
/// serialization round trip fails here instead of at serving time.
fn verify_artifact(path: &Path) -> Result<()> {
    let artifact = ModelArtifact::load(path)?;
    let sample = [5.1, 3.5, 1.4, 0.2];
    let prediction = artifact.predict(&sample)?;
    tracing::info!(
        label = %prediction.label,
        confidence = prediction.confidence,
        "Verification prediction on sample input"
    );
    Ok(())
}
