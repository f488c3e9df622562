//! Request-side feature validation.
//!
//! Incoming feature records are JSON objects keyed by feature name. A record
//! is only handed to the model once every required key is present, numeric,
//! finite, and inside the plausible measurement range.

use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

/// Iris measurements are centimeter-scale; anything outside this range is a
/// caller mistake rather than an unusual flower.
pub const FEATURE_MIN: f64 = 0.0;
pub const FEATURE_MAX: f64 = 10.0;

/// Validates a feature record against the artifact's feature schema and
/// returns the values ordered by `feature_names`, ready for the model.
pub fn validate_features(features: &Map<String, Value>, feature_names: &[String]) -> Result<Vec<f64>> {
    for key in features.keys() {
        if !feature_names.iter().any(|name| name == key) {
            return Err(CoreError::Validation(format!(
                "unknown feature `{key}`; expected features: {}",
                feature_names.join(", ")
            )));
        }
    }

    let mut ordered = Vec::with_capacity(feature_names.len());
    for name in feature_names {
        let value = features.get(name).ok_or_else(|| {
            CoreError::Validation(format!("missing required feature `{name}`"))
        })?;
        let number = value.as_f64().ok_or_else(|| {
            CoreError::Validation(format!("feature `{name}` must be a number, got {value}"))
        })?;
        if !number.is_finite() {
            return Err(CoreError::Validation(format!(
                "feature `{name}` must be finite"
            )));
        }
        if !(FEATURE_MIN..=FEATURE_MAX).contains(&number) {
            return Err(CoreError::Validation(format!(
                "feature `{name}` must be between {FEATURE_MIN} and {FEATURE_MAX}, got {number}"
            )));
        }
        ordered.push(number);
    }
    Ok(ordered)
}
