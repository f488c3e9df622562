//! Holdout evaluation metrics for the trained classifier.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Classification accuracy over a holdout set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    /// Accuracy score (0.0 to 1.0)
    pub accuracy: f64,
    /// Number of correct predictions
    pub correct_count: usize,
    /// Total number of predictions
    pub total_count: usize,
}

/// Confusion matrix with weighted-average classification metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfusionMatrixSummary {
    /// 2D confusion matrix (rows=actual, cols=predicted)
    pub matrix: Vec<Vec<u64>>,
    /// Class labels in the order they appear in the matrix
    pub labels: Vec<String>,
    /// Weighted average precision across all classes
    pub precision: f64,
    /// Weighted average recall across all classes
    pub recall: f64,
    /// Weighted average F1 score across all classes
    pub f1_score: f64,
    /// Total number of samples
    pub total_samples: usize,
}

pub fn accuracy(predicted: &[usize], actual: &[usize]) -> Result<AccuracyMetrics> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(CoreError::Training(format!(
            "accuracy needs matching non-empty slices, got {} predictions and {} actuals",
            predicted.len(),
            actual.len()
        )));
    }
    let correct_count = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| p == a)
        .count();
    Ok(AccuracyMetrics {
        accuracy: correct_count as f64 / predicted.len() as f64,
        correct_count,
        total_count: predicted.len(),
    })
}

pub fn confusion_matrix(
    predicted: &[usize],
    actual: &[usize],
    labels: &[String],
) -> Result<ConfusionMatrixSummary> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(CoreError::Training(format!(
            "confusion matrix needs matching non-empty slices, got {} predictions and {} actuals",
            predicted.len(),
            actual.len()
        )));
    }
    let n = labels.len();
    let mut matrix = vec![vec![0u64; n]; n];
    for (p, a) in predicted.iter().zip(actual.iter()) {
        if *p >= n || *a >= n {
            return Err(CoreError::Training(format!(
                "class index out of range: predicted {p}, actual {a}, {n} labels"
            )));
        }
        matrix[*a][*p] += 1;
    }

    let total = predicted.len() as f64;
    let mut precision = 0.0;
    let mut recall = 0.0;
    let mut f1_score = 0.0;
    for class in 0..n {
        let tp = matrix[class][class] as f64;
        let support: f64 = matrix[class].iter().sum::<u64>() as f64;
        let predicted_as: f64 = (0..n).map(|row| matrix[row][class]).sum::<u64>() as f64;

        let class_precision = if predicted_as > 0.0 { tp / predicted_as } else { 0.0 };
        let class_recall = if support > 0.0 { tp / support } else { 0.0 };
        let class_f1 = if class_precision + class_recall > 0.0 {
            2.0 * class_precision * class_recall / (class_precision + class_recall)
        } else {
            0.0
        };

        let weight = support / total;
        precision += class_precision * weight;
        recall += class_recall * weight;
        f1_score += class_f1 * weight;
    }

    Ok(ConfusionMatrixSummary {
        matrix,
        labels: labels.to_vec(),
        precision,
        recall,
        f1_score,
        total_samples: predicted.len(),
    })
}
