//! Error taxonomy shared by every component

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading data, artifacts, or computing reports
#[derive(Debug, Error)]
pub enum Error {
    #[error("CRITICAL: Dataset missing at {}", path.display())]
    DatasetMissing { path: PathBuf },

    #[error("artifact missing at {}", path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("missing required features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("feature '{feature}' has non-numeric value {value}")]
    MalformedValue { feature: String, value: String },

    #[error("shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("projection failed: {0}")]
    Projection(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataframe error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl Error {
    /// Whether the failure was caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingFeatures(_) | Error::MalformedValue { .. } | Error::ShapeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_missing_names_path() {
        let err = Error::DatasetMissing { path: PathBuf::from("/srv/data/members.csv") };
        assert_eq!(err.to_string(), "CRITICAL: Dataset missing at /srv/data/members.csv");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_missing_features_lists_all() {
        let err = Error::MissingFeatures(vec!["age".to_string(), "tenure".to_string()]);
        assert_eq!(err.to_string(), "missing required features: age, tenure");
        assert!(err.is_client_error());
    }
}
