//! Dataset loading and deterministic train/test splitting.
//!
//! The iris measurements ship with the [`linfa_datasets`] crate; this module
//! wraps them together with the feature and class names the serving layer
//! needs for validation and response labeling.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

pub const IRIS_FEATURE_NAMES: [&str; 4] = [
    "sepal_length",
    "sepal_width",
    "petal_length",
    "petal_width",
];

pub const IRIS_TARGET_NAMES: [&str; 3] = ["Iris-setosa", "Iris-versicolor", "Iris-virginica"];

/// A feature matrix with class targets plus the naming metadata that ends up
/// in the trained artifact.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    pub name: String,
    pub records: Array2<f64>,
    pub targets: Array1<usize>,
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
}

impl LabeledDataset {
    pub fn new(
        name: impl Into<String>,
        records: Array2<f64>,
        targets: Array1<usize>,
        feature_names: Vec<String>,
        target_names: Vec<String>,
    ) -> Result<Self> {
        if records.nrows() != targets.len() {
            return Err(CoreError::Training(format!(
                "record/target length mismatch: {} records vs {} targets",
                records.nrows(),
                targets.len()
            )));
        }
        if records.ncols() != feature_names.len() {
            return Err(CoreError::Training(format!(
                "expected {} feature columns, got {}",
                feature_names.len(),
                records.ncols()
            )));
        }
        Ok(Self {
            name: name.into(),
            records,
            targets,
            feature_names,
            target_names,
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Materializes a subset of the rows by index.
    pub fn select(&self, indices: &[usize]) -> (Array2<f64>, Array1<usize>) {
        (
            self.records.select(Axis(0), indices),
            self.targets.select(Axis(0), indices),
        )
    }
}

/// The iris dataset with its canonical feature and class names.
pub fn iris() -> LabeledDataset {
    let ds = linfa_datasets::iris();
    LabeledDataset {
        name: "iris".to_string(),
        records: ds.records.to_owned(),
        targets: ds.targets.to_owned(),
        feature_names: IRIS_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        target_names: IRIS_TARGET_NAMES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Stratified shuffled split: each class contributes `ratio` of its rows to
/// the training set, so small classes are not starved by an unlucky shuffle.
///
/// Returns `(train_indices, test_indices)`. Deterministic for a given seed.
pub fn stratified_split_indices(
    targets: &Array1<usize>,
    ratio: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&ratio) || ratio == 0.0 {
        return Err(CoreError::Training(format!(
            "split ratio must be in (0, 1), got {ratio}"
        )));
    }

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, class) in targets.iter().enumerate() {
        by_class.entry(*class).or_default().push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for (_, mut indices) in by_class {
        indices.shuffle(&mut rng);
        let cut = ((indices.len() as f64) * ratio).round() as usize;
        let cut = cut.clamp(1, indices.len());
        test.extend_from_slice(&indices[cut..]);
        train.extend_from_slice(&indices[..cut]);
    }

    // Row order within each split is otherwise grouped by class.
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    if test.is_empty() {
        return Err(CoreError::Training(
            "split produced an empty test set; lower the split ratio".to_string(),
        ));
    }
    Ok((train, test))
}

/// Samples `len` row indices with replacement for one bagging round.
pub fn bootstrap_indices(len: usize, rng: &mut StdRng) -> Vec<usize> {
    (0..len).map(|_| rng.random_range(0..len)).collect()
}
