//! The trained model artifact: a bagged ensemble of decision trees together
//! with the metadata the serving layer needs (feature schema, class names,
//! training provenance).
//!
//! Artifacts are serialized as a versioned MessagePack envelope so the on-disk
//! format can evolve without breaking older servers, and are immutable once
//! loaded.

use chrono::{DateTime, Utc};
use linfa::DatasetBase;
use linfa::traits::Predict;
use linfa_trees::DecisionTree;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{CoreError, Result};

/// Bump when the serialized layout changes.
const ARTIFACT_FORMAT_VERSION: u8 = 1;

/// Versioned wrapper around the MessagePack-encoded artifact body.
#[derive(Serialize, Deserialize)]
struct ArtifactEnvelope {
    version: u8,
    payload: Vec<u8>,
}

/// Hyperparameters used to fit the ensemble.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hyperparameters {
    /// Number of bagged trees
    pub trees: usize,
    /// Maximum tree depth (0 = unlimited)
    pub max_depth: usize,
    /// Minimum sample weight required to split a node
    pub min_weight_split: f32,
    /// Fraction of rows assigned to the training set
    pub split_ratio: f64,
    /// RNG seed for the split and the bootstrap samples
    pub seed: u64,
}

/// Training provenance and the feature/class schema of an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub model_type: String,
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub dataset: String,
    pub dataset_size: usize,
    pub train_size: usize,
    pub test_size: usize,
    /// Required feature keys, in the column order the trees were fit on
    pub feature_names: Vec<String>,
    /// Class names indexed by class id
    pub target_names: Vec<String>,
    /// Holdout accuracy measured at training time
    pub accuracy: f64,
    pub hyperparameters: Hyperparameters,
}

/// Structured output of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class name
    pub label: String,
    /// Predicted class id
    pub class_index: usize,
    /// Fraction of trees that voted for the winning class, in [0, 1]
    pub confidence: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub meta: ArtifactMeta,
    trees: Vec<DecisionTree<f64, usize>>,
}

impl ModelArtifact {
    pub fn new(trees: Vec<DecisionTree<f64, usize>>, meta: ArtifactMeta) -> Self {
        Self { meta, trees }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.meta.feature_names.len()
    }

    pub fn n_classes(&self) -> usize {
        self.meta.target_names.len()
    }

    /// Predicts a single feature vector, ordered per `meta.feature_names`.
    pub fn predict(&self, features: &[f64]) -> Result<Prediction> {
        if features.len() != self.n_features() {
            return Err(CoreError::Validation(format!(
                "expected {} features, got {}",
                self.n_features(),
                features.len()
            )));
        }
        let records = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| CoreError::Inference(format!("could not shape input row: {e}")))?;
        let mut outcomes = self.vote_rows(records)?;
        outcomes
            .pop()
            .ok_or_else(|| CoreError::Inference("got an empty prediction".to_string()))
    }

    /// Majority vote of all trees over a batch of rows.
    ///
    /// Ties resolve to the lowest class id, so repeated identical inputs
    /// always produce identical predictions.
    pub(crate) fn vote_rows(&self, records: Array2<f64>) -> Result<Vec<Prediction>> {
        if self.trees.is_empty() {
            return Err(CoreError::Inference(
                "artifact contains no trees".to_string(),
            ));
        }
        let n_rows = records.nrows();
        let n_classes = self.n_classes();
        let dataset = DatasetBase::from(records);

        let mut tallies = vec![vec![0usize; n_classes]; n_rows];
        for tree in &self.trees {
            let predictions = tree.predict(&dataset);
            for (row, class) in predictions.iter().enumerate() {
                if *class >= n_classes {
                    return Err(CoreError::Inference(format!(
                        "couldn't map prediction {} to any of the {} known classes",
                        class, n_classes
                    )));
                }
                tallies[row][*class] += 1;
            }
        }

        let total = self.trees.len() as f64;
        tallies
            .into_iter()
            .map(|votes| {
                let mut class_index = 0usize;
                let mut count = 0usize;
                for (idx, votes_for) in votes.iter().enumerate() {
                    if *votes_for > count {
                        count = *votes_for;
                        class_index = idx;
                    }
                }
                let label = self
                    .meta
                    .target_names
                    .get(class_index)
                    .cloned()
                    .ok_or_else(|| {
                        CoreError::Inference(format!(
                            "couldn't map prediction {} to a class name",
                            class_index
                        ))
                    })?;
                Ok(Prediction {
                    label,
                    class_index,
                    confidence: count as f64 / total,
                })
            })
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = rmp_serde::to_vec(self)?;
        let envelope = ArtifactEnvelope {
            version: ARTIFACT_FORMAT_VERSION,
            payload,
        };
        Ok(rmp_serde::to_vec(&envelope)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: ArtifactEnvelope = rmp_serde::from_slice(bytes)?;
        if envelope.version != ARTIFACT_FORMAT_VERSION {
            return Err(CoreError::Artifact(format!(
                "unsupported artifact format version: {}",
                envelope.version
            )));
        }
        Ok(rmp_serde::from_slice(&envelope.payload)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()?)?;
        tracing::info!(path = %path.display(), "Saved model artifact");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let artifact = Self::from_bytes(&bytes)?;
        tracing::info!(
            path = %path.display(),
            version = %artifact.meta.version,
            trees = artifact.n_trees(),
            "Loaded model artifact"
        );
        Ok(artifact)
    }
}
