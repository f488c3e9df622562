//! Versioned model registry.
//!
//! Mirrors the deployment layout on disk: a models directory holding one
//! `model_<version>.bin` per trained artifact. Everything is loaded once at
//! startup and shared read-only afterwards; reloading means restarting the
//! process.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::artifact::ModelArtifact;
use crate::error::{CoreError, Result};

const ARTIFACT_PREFIX: &str = "model_";
const ARTIFACT_EXT: &str = "bin";

/// Summary of a loaded artifact for the model-info endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ModelInfo {
    pub version: String,
    pub model_type: String,
    pub n_features: usize,
    pub n_classes: usize,
    pub classes: Vec<String>,
    pub n_trees: usize,
    pub accuracy: f64,
    pub trained_at: chrono::DateTime<chrono::Utc>,
}

pub struct ModelRegistry {
    models: HashMap<String, Arc<ModelArtifact>>,
    active_version: String,
}

impl ModelRegistry {
    pub fn new(active_version: impl Into<String>) -> Self {
        Self {
            models: HashMap::new(),
            active_version: active_version.into(),
        }
    }

    /// Loads every `model_*.bin` in `dir`. Artifacts that fail to decode are
    /// skipped with an error log; a missing directory yields an empty
    /// registry so the server can still come up degraded.
    pub fn load_dir(dir: impl AsRef<Path>, active_version: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let mut registry = Self::new(active_version);

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!(dir = %dir.display(), %err, "Models directory not readable");
                return Ok(registry);
            }
        };

        for entry in entries {
            let path = entry?.path();
            let Some(version) = artifact_version(&path) else {
                continue;
            };
            match ModelArtifact::load(&path) {
                Ok(artifact) => {
                    registry.insert(version, artifact);
                }
                Err(err) => {
                    tracing::error!(path = %path.display(), %err, "Failed to load model artifact");
                }
            }
        }

        if registry.is_empty() {
            tracing::warn!(dir = %dir.display(), "No model artifacts loaded");
        } else if !registry.models.contains_key(&registry.active_version) {
            tracing::warn!(
                active = %registry.active_version,
                loaded = ?registry.loaded_versions(),
                "Active model version is not among the loaded artifacts"
            );
        }
        Ok(registry)
    }

    pub fn insert(&mut self, version: impl Into<String>, artifact: ModelArtifact) {
        self.models.insert(version.into(), Arc::new(artifact));
    }

    /// Resolves a requested version, falling back to the active one.
    ///
    /// Requesting a version that is not loaded is a caller error, matching
    /// the endpoint contract (client-error response).
    pub fn resolve(&self, version: Option<&str>) -> Result<Arc<ModelArtifact>> {
        let version = version.unwrap_or(&self.active_version);
        self.models.get(version).cloned().ok_or_else(|| {
            CoreError::Validation(format!("model version `{version}` not loaded"))
        })
    }

    pub fn get(&self, version: &str) -> Option<Arc<ModelArtifact>> {
        self.models.get(version).cloned()
    }

    pub fn active_version(&self) -> &str {
        &self.active_version
    }

    pub fn loaded_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.models.keys().cloned().collect();
        versions.sort();
        versions
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn info(&self, version: &str) -> Option<ModelInfo> {
        self.models.get(version).map(|artifact| ModelInfo {
            version: version.to_string(),
            model_type: artifact.meta.model_type.clone(),
            n_features: artifact.n_features(),
            n_classes: artifact.n_classes(),
            classes: artifact.meta.target_names.clone(),
            n_trees: artifact.n_trees(),
            accuracy: artifact.meta.accuracy,
            trained_at: artifact.meta.trained_at,
        })
    }

    /// Info for every loaded version, keyed by version in stable order.
    pub fn all_info(&self) -> BTreeMap<String, ModelInfo> {
        self.models
            .keys()
            .filter_map(|version| self.info(version).map(|info| (version.clone(), info)))
            .collect()
    }
}

/// Extracts `<version>` from a `model_<version>.bin` file name.
fn artifact_version(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXT) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let version = stem.strip_prefix(ARTIFACT_PREFIX)?;
    if version.is_empty() {
        return None;
    }
    Some(version.to_string())
}

/// Builds the artifact file name for a version.
pub fn artifact_file_name(version: &str) -> String {
    format!("{ARTIFACT_PREFIX}{version}.{ARTIFACT_EXT}")
}
