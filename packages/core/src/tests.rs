//! Tests for training, validation, metrics, and artifact handling.

use ndarray::{Array1, Array2};
use serde_json::{Map, json};

use crate::artifact::ModelArtifact;
use crate::dataset::{self, LabeledDataset};
use crate::error::CoreError;
use crate::metrics;
use crate::registry::{ModelRegistry, artifact_file_name};
use crate::training::{self, TrainOptions};
use crate::validation::validate_features;

/// Two well-separated classes in two dimensions, 20 rows each.
fn synthetic_dataset() -> LabeledDataset {
    let mut rows = Vec::new();
    let mut targets = Vec::new();
    for i in 0..20 {
        rows.extend_from_slice(&[1.0 + 0.01 * i as f64, 1.5 + 0.01 * i as f64]);
        targets.push(0usize);
    }
    for i in 0..20 {
        rows.extend_from_slice(&[8.0 + 0.01 * i as f64, 7.5 + 0.01 * i as f64]);
        targets.push(1usize);
    }
    LabeledDataset::new(
        "synthetic",
        Array2::from_shape_vec((40, 2), rows).unwrap(),
        Array1::from_vec(targets),
        vec!["width".to_string(), "height".to_string()],
        vec!["small".to_string(), "large".to_string()],
    )
    .unwrap()
}

fn test_options() -> TrainOptions {
    TrainOptions {
        version: "test".to_string(),
        trees: 15,
        max_depth: 3,
        min_weight_split: 2.0,
        split_ratio: 0.8,
        seed: 7,
    }
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn validate_features_orders_by_schema() {
    let schema = vec!["width".to_string(), "height".to_string()];
    let mut map = Map::new();
    map.insert("height".to_string(), json!(2.5));
    map.insert("width".to_string(), json!(1));

    let ordered = validate_features(&map, &schema).unwrap();
    assert_eq!(ordered, vec![1.0, 2.5]);
}

#[test]
fn validate_features_rejects_missing_key() {
    let schema = vec!["width".to_string(), "height".to_string()];
    let mut map = Map::new();
    map.insert("width".to_string(), json!(1.0));

    let err = validate_features(&map, &schema).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("height"));
}

#[test]
fn validate_features_rejects_non_numeric() {
    let schema = vec!["width".to_string()];
    let mut map = Map::new();
    map.insert("width".to_string(), json!("wide"));

    assert!(validate_features(&map, &schema).unwrap_err().is_validation());
}

#[test]
fn validate_features_rejects_out_of_range() {
    let schema = vec!["width".to_string()];
    let mut map = Map::new();
    map.insert("width".to_string(), json!(42.0));

    assert!(validate_features(&map, &schema).unwrap_err().is_validation());
}

#[test]
fn validate_features_rejects_unknown_key() {
    let schema = vec!["width".to_string()];
    let mut map = Map::new();
    map.insert("width".to_string(), json!(1.0));
    map.insert("wingspan".to_string(), json!(1.0));

    let err = validate_features(&map, &schema).unwrap_err();
    assert!(err.to_string().contains("wingspan"));
}

// ============================================================================
// Metrics
// ============================================================================

#[test]
fn accuracy_counts_matches() {
    let result = metrics::accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]).unwrap();
    assert_eq!(result.correct_count, 3);
    assert_eq!(result.total_count, 4);
    assert!((result.accuracy - 0.75).abs() < 1e-12);
}

#[test]
fn accuracy_rejects_length_mismatch() {
    assert!(metrics::accuracy(&[0, 1], &[0]).is_err());
    assert!(metrics::accuracy(&[], &[]).is_err());
}

#[test]
fn confusion_matrix_perfect_predictions() {
    let labels = vec!["a".to_string(), "b".to_string()];
    let result = metrics::confusion_matrix(&[0, 1, 0, 1], &[0, 1, 0, 1], &labels).unwrap();
    assert_eq!(result.matrix, vec![vec![2, 0], vec![0, 2]]);
    assert!((result.precision - 1.0).abs() < 1e-12);
    assert!((result.recall - 1.0).abs() < 1e-12);
    assert!((result.f1_score - 1.0).abs() < 1e-12);
    assert_eq!(result.total_samples, 4);
}

#[test]
fn confusion_matrix_rejects_out_of_range_class() {
    let labels = vec!["a".to_string()];
    assert!(metrics::confusion_matrix(&[1], &[0], &labels).is_err());
}

// ============================================================================
// Dataset splitting
// ============================================================================

#[test]
fn stratified_split_is_deterministic() {
    let data = synthetic_dataset();
    let (train_a, test_a) = dataset::stratified_split_indices(&data.targets, 0.8, 7).unwrap();
    let (train_b, test_b) = dataset::stratified_split_indices(&data.targets, 0.8, 7).unwrap();
    assert_eq!(train_a, train_b);
    assert_eq!(test_a, test_b);
}

#[test]
fn stratified_split_covers_all_rows_once() {
    let data = synthetic_dataset();
    let (train, test) = dataset::stratified_split_indices(&data.targets, 0.8, 7).unwrap();
    let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..data.len()).collect::<Vec<_>>());
}

#[test]
fn stratified_split_keeps_class_balance() {
    let data = synthetic_dataset();
    let (train, _) = dataset::stratified_split_indices(&data.targets, 0.8, 7).unwrap();
    let small = train.iter().filter(|&&i| data.targets[i] == 0).count();
    let large = train.iter().filter(|&&i| data.targets[i] == 1).count();
    assert_eq!(small, 16);
    assert_eq!(large, 16);
}

#[test]
fn stratified_split_rejects_bad_ratio() {
    let data = synthetic_dataset();
    assert!(dataset::stratified_split_indices(&data.targets, 0.0, 7).is_err());
    assert!(dataset::stratified_split_indices(&data.targets, 1.5, 7).is_err());
}

// ============================================================================
// Training & inference
// ============================================================================

#[test]
fn train_separable_data_predicts_correctly() {
    let data = synthetic_dataset();
    let (artifact, metadata) = training::train(&data, &test_options()).unwrap();

    assert_eq!(artifact.n_trees(), 15);
    assert!(metadata.meta.accuracy > 0.9);

    let prediction = artifact.predict(&[1.1, 1.6]).unwrap();
    assert_eq!(prediction.label, "small");
    assert!(prediction.confidence >= 0.5);
    assert!(prediction.confidence <= 1.0);

    let prediction = artifact.predict(&[8.1, 7.6]).unwrap();
    assert_eq!(prediction.label, "large");
}

#[test]
fn training_is_deterministic_for_a_seed() {
    let data = synthetic_dataset();
    let (artifact_a, _) = training::train(&data, &test_options()).unwrap();
    let (artifact_b, _) = training::train(&data, &test_options()).unwrap();

    for point in [[1.2, 1.4], [4.5, 4.5], [7.9, 8.2]] {
        let a = artifact_a.predict(&point).unwrap();
        let b = artifact_b.predict(&point).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn repeated_predictions_are_identical() {
    let data = synthetic_dataset();
    let (artifact, _) = training::train(&data, &test_options()).unwrap();
    let first = artifact.predict(&[4.5, 4.5]).unwrap();
    let second = artifact.predict(&[4.5, 4.5]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn predict_rejects_wrong_feature_count() {
    let data = synthetic_dataset();
    let (artifact, _) = training::train(&data, &test_options()).unwrap();
    let err = artifact.predict(&[1.0]).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn train_rejects_zero_trees() {
    let data = synthetic_dataset();
    let opts = TrainOptions {
        trees: 0,
        ..test_options()
    };
    assert!(matches!(
        training::train(&data, &opts),
        Err(CoreError::Training(_))
    ));
}

// ============================================================================
// Artifact serialization
// ============================================================================

#[test]
fn artifact_survives_encode_decode() {
    let data = synthetic_dataset();
    let (artifact, _) = training::train(&data, &test_options()).unwrap();

    let bytes = artifact.to_bytes().unwrap();
    let restored = ModelArtifact::from_bytes(&bytes).unwrap();

    assert_eq!(restored.meta.version, "test");
    assert_eq!(restored.n_trees(), artifact.n_trees());
    assert_eq!(
        restored.predict(&[1.1, 1.6]).unwrap(),
        artifact.predict(&[1.1, 1.6]).unwrap()
    );
}

#[test]
fn artifact_rejects_garbage_bytes() {
    assert!(ModelArtifact::from_bytes(&[0xde, 0xad, 0xbe, 0xef]).is_err());
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn registry_resolves_active_and_explicit_versions() {
    let data = synthetic_dataset();
    let (artifact, _) = training::train(&data, &test_options()).unwrap();

    let mut registry = ModelRegistry::new("test");
    registry.insert("test", artifact);

    assert!(registry.resolve(None).is_ok());
    assert!(registry.resolve(Some("test")).is_ok());

    let err = registry.resolve(Some("v9")).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("v9"));
}

#[test]
fn registry_loads_artifacts_from_directory() {
    let data = synthetic_dataset();
    let (artifact, _) = training::train(&data, &test_options()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    artifact.save(dir.path().join(artifact_file_name("test"))).unwrap();
    // Unrelated files are ignored.
    std::fs::write(dir.path().join("notes.txt"), b"not a model").unwrap();

    let registry = ModelRegistry::load_dir(dir.path(), "test").unwrap();
    assert_eq!(registry.loaded_versions(), vec!["test".to_string()]);
    assert_eq!(registry.info("test").unwrap().n_classes, 2);
}

#[test]
fn registry_tolerates_missing_directory() {
    let registry = ModelRegistry::load_dir("/nonexistent/models", "v1").unwrap();
    assert!(registry.is_empty());
}
