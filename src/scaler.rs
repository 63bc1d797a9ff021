//! Persisted standardization transform with its trained feature order

use crate::error::Error;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// File name of the scaler artifact inside the model directory
pub const SCALER_FILE_NAME: &str = "standard_scaler.json";

/// Fitted per-feature mean/scale transform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names_in: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Load and validate a scaler artifact
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Err(Error::ArtifactMissing { path: path.to_path_buf() });
        }
        let scaler: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> crate::Result<()> {
        let n = self.feature_names_in.len();
        if n == 0 {
            return Err(Error::InvalidArtifact("scaler has no features".to_string()));
        }
        for len in [self.mean.len(), self.scale.len()] {
            if len != n {
                return Err(Error::ShapeMismatch { expected: n, actual: len });
            }
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.feature_names_in.len()
    }

    /// Pick the trained features out of an arbitrary record, in trained order
    ///
    /// Every missing feature is reported at once. Numbers, booleans and
    /// numeric strings are accepted; anything else is malformed.
    pub fn align(&self, record: &Map<String, Value>) -> crate::Result<Array1<f64>> {
        let missing: Vec<String> = self
            .feature_names_in
            .iter()
            .filter(|name| !record.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingFeatures(missing));
        }

        self.feature_names_in
            .iter()
            .map(|name| numeric_value(name, &record[name.as_str()]))
            .collect()
    }

    /// Standardize an aligned feature vector
    pub fn transform(&self, features: &Array1<f64>) -> crate::Result<Array1<f64>> {
        if features.len() != self.n_features() {
            return Err(Error::ShapeMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }
        let scaled = features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect();
        Ok(scaled)
    }
}

/// Numeric reading of one record value
pub(crate) fn numeric_value(feature: &str, value: &Value) -> crate::Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).ok_or_else(|| Error::MalformedValue {
        feature: feature.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scaler() -> StandardScaler {
        StandardScaler {
            feature_names_in: vec!["age".into(), "balance".into(), "active_member".into()],
            mean: vec![40.0, 50_000.0, 0.5],
            scale: vec![10.0, 25_000.0, 0.0],
        }
    }

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_align_reorders_and_ignores_extras() {
        let input = record(json!({"active_member": 1, "cluster": 3, "balance": 75000.0, "age": 50}));
        let aligned = scaler().align(&input).unwrap();
        assert_eq!(aligned.to_vec(), vec![50.0, 75_000.0, 1.0]);
    }

    #[test]
    fn test_align_reports_every_missing_feature() {
        let input = record(json!({"age": 50}));
        match scaler().align(&input).unwrap_err() {
            Error::MissingFeatures(names) => assert_eq!(names, vec!["balance", "active_member"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_align_rejects_malformed_values() {
        let input = record(json!({"age": "forty", "balance": 1.0, "active_member": true}));
        let err = scaler().align(&input).unwrap_err();
        assert!(matches!(err, Error::MalformedValue { ref feature, .. } if feature == "age"));

        let input = record(json!({"age": null, "balance": 1.0, "active_member": 0}));
        assert!(scaler().align(&input).is_err());
    }

    #[test]
    fn test_align_accepts_numeric_strings_and_bools() {
        let input = record(json!({"age": " 35 ", "balance": "0", "active_member": false}));
        assert_eq!(scaler().align(&input).unwrap().to_vec(), vec![35.0, 0.0, 0.0]);
    }

    #[test]
    fn test_transform_standardizes() {
        let scaled = scaler().transform(&Array1::from(vec![50.0, 0.0, 1.0])).unwrap();
        assert_eq!(scaled.to_vec(), vec![1.0, -2.0, 0.5]);
    }

    #[test]
    fn test_transform_shape_mismatch() {
        let err = scaler().transform(&Array1::from(vec![0.0])).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 3, actual: 1 }));
    }

    #[test]
    fn test_load_rejects_inconsistent_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCALER_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"feature_names_in": ["a", "b"], "mean": [0.0], "scale": [1.0, 1.0]}"#,
        )
        .unwrap();

        assert!(matches!(
            StandardScaler::load(&path),
            Err(Error::ShapeMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StandardScaler::load(&dir.path().join(SCALER_FILE_NAME)).unwrap_err();
        assert!(matches!(err, Error::ArtifactMissing { .. }));
    }
}
