//! Core library for the bloom model service: training, artifact handling,
//! validation, and inference for the iris classifier.

pub mod artifact;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod training;
pub mod validation;

#[cfg(test)]
mod tests;

pub use artifact::{ArtifactMeta, Hyperparameters, ModelArtifact, Prediction};
pub use error::{CoreError, Result};
pub use registry::{ModelInfo, ModelRegistry};
pub use training::{TrainOptions, TrainingMetadata};
