//! Fits the bagged decision-tree classifier and evaluates it on a holdout
//! split.

use chrono::Utc;
use linfa::DatasetBase;
use linfa::traits::Fit;
use linfa_trees::DecisionTree;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::artifact::{ArtifactMeta, Hyperparameters, ModelArtifact};
use crate::dataset::{self, LabeledDataset};
use crate::error::{CoreError, Result};
use crate::metrics::{self, AccuracyMetrics, ConfusionMatrixSummary};

#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub version: String,
    pub trees: usize,
    /// Maximum tree depth (0 = unlimited)
    pub max_depth: usize,
    pub min_weight_split: f32,
    pub split_ratio: f64,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            trees: 100,
            max_depth: 3,
            min_weight_split: 2.0,
            split_ratio: 0.8,
            seed: 42,
        }
    }
}

impl TrainOptions {
    fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters {
            trees: self.trees,
            max_depth: self.max_depth,
            min_weight_split: self.min_weight_split,
            split_ratio: self.split_ratio,
            seed: self.seed,
        }
    }
}

/// Everything the trainer writes next to the artifact as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetadata {
    #[serde(flatten)]
    pub meta: ArtifactMeta,
    pub accuracy_metrics: AccuracyMetrics,
    pub confusion_matrix: ConfusionMatrixSummary,
    pub train_time_secs: f64,
}

/// Trains the ensemble and evaluates it on the holdout rows.
pub fn train(data: &LabeledDataset, opts: &TrainOptions) -> Result<(ModelArtifact, TrainingMetadata)> {
    if opts.trees == 0 {
        return Err(CoreError::Training(
            "ensemble needs at least one tree".to_string(),
        ));
    }
    if data.is_empty() {
        return Err(CoreError::Training("dataset is empty".to_string()));
    }

    let started = Instant::now();
    let (train_idx, test_idx) =
        dataset::stratified_split_indices(&data.targets, opts.split_ratio, opts.seed)?;
    let (train_records, train_targets) = data.select(&train_idx);
    let (test_records, test_targets) = data.select(&test_idx);
    tracing::debug!(
        train = train_idx.len(),
        test = test_idx.len(),
        "Split dataset"
    );

    let train_set = LabeledDataset::new(
        data.name.clone(),
        train_records,
        train_targets,
        data.feature_names.clone(),
        data.target_names.clone(),
    )?;

    // One RNG drives every bootstrap sample, so a fixed seed reproduces the
    // exact same forest.
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut trees = Vec::with_capacity(opts.trees);
    for _ in 0..opts.trees {
        let sample = dataset::bootstrap_indices(train_set.len(), &mut rng);
        let (records, targets) = train_set.select(&sample);
        let ds = DatasetBase::from(records).with_targets(targets);

        let mut params = DecisionTree::params();
        if opts.max_depth > 0 {
            params = params.max_depth(Some(opts.max_depth));
        }
        if opts.min_weight_split > 0.0 {
            params = params.min_weight_split(opts.min_weight_split);
        }
        let tree = params
            .fit(&ds)
            .map_err(|e| CoreError::Training(format!("tree fit failed: {e}")))?;
        trees.push(tree);
    }
    tracing::debug!(trees = trees.len(), elapsed = ?started.elapsed(), "Fit ensemble");

    let meta = ArtifactMeta {
        model_type: "BaggedDecisionTrees".to_string(),
        version: opts.version.clone(),
        trained_at: Utc::now(),
        dataset: data.name.clone(),
        dataset_size: data.len(),
        train_size: train_idx.len(),
        test_size: test_idx.len(),
        feature_names: data.feature_names.clone(),
        target_names: data.target_names.clone(),
        accuracy: 0.0,
        hyperparameters: opts.hyperparameters(),
    };
    let mut artifact = ModelArtifact::new(trees, meta);

    let predictions = artifact.vote_rows(test_records)?;
    let predicted: Vec<usize> = predictions.iter().map(|p| p.class_index).collect();
    let actual: Vec<usize> = test_targets.iter().copied().collect();
    let accuracy_metrics = metrics::accuracy(&predicted, &actual)?;
    let confusion = metrics::confusion_matrix(&predicted, &actual, &data.target_names)?;
    artifact.meta.accuracy = accuracy_metrics.accuracy;

    let metadata = TrainingMetadata {
        meta: artifact.meta.clone(),
        accuracy_metrics,
        confusion_matrix: confusion,
        train_time_secs: started.elapsed().as_secs_f64(),
    };
    tracing::info!(
        version = %metadata.meta.version,
        accuracy = metadata.meta.accuracy,
        "Training complete"
    );
    Ok((artifact, metadata))
}
