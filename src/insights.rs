//! Model evaluation report card
//!
//! The numbers come from the hold-out evaluation of the shipped gradient
//! boosting model. They are fixed at build time and served as-is.

use serde::{Deserialize, Serialize};

/// Hold-out confusion matrix for the churn class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub false_negatives: u64,
    pub tp: u64,
}

impl ConfusionMatrix {
    pub fn total(&self) -> u64 {
        self.tn + self.fp + self.false_negatives + self.tp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Summary classification metrics, rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ReportMetrics {
    /// Derive the summary metrics from a confusion matrix
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let ratio = |num: u64, den: u64| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(cm.tp, cm.tp + cm.fp);
        let recall = ratio(cm.tp, cm.tp + cm.false_negatives);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            accuracy: round2(ratio(cm.tp + cm.tn, cm.total())),
            precision: round2(precision),
            recall: round2(recall),
            f1: round2(f1),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Payload of `GET /api/model-insights`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInsights {
    pub confusion_matrix: ConfusionMatrix,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roc_curve: Option<Vec<RocPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<FeatureImportance>>,
    pub report: ReportMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u64>,
}

const CONFUSION: ConfusionMatrix = ConfusionMatrix { tn: 1404, fp: 174, false_negatives: 149, tp: 253 };

const ROC_CURVE: [RocPoint; 4] = [
    RocPoint { fpr: 0.0, tpr: 0.0 },
    RocPoint { fpr: 0.11, tpr: 0.63 },
    RocPoint { fpr: 0.45, tpr: 0.88 },
    RocPoint { fpr: 1.0, tpr: 1.0 },
];

impl ModelInsights {
    /// The canonical report card for the shipped model
    pub fn canonical() -> Self {
        Self {
            confusion_matrix: CONFUSION,
            roc_curve: Some(ROC_CURVE.to_vec()),
            feature_importances: None,
            report: ReportMetrics::from_confusion(&CONFUSION),
            sample_size: Some(CONFUSION.total()),
        }
    }
}
