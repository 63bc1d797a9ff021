//! Single-record churn scoring through the persisted scaler and classifier

use crate::error::Error;
use crate::model::{ChurnModel, MODEL_FILE_NAME};
use crate::scaler::{numeric_value, StandardScaler, SCALER_FILE_NAME};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Risk band reported alongside a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "High Alert")]
    HighAlert,
    Elevated,
    Stable,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            RiskLevel::HighAlert
        } else if score > 0.4 {
            RiskLevel::Elevated
        } else {
            RiskLevel::Stable
        }
    }
}

/// Result of scoring one member record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub score: f64,
    pub risk_level: RiskLevel,
    /// Balance weighted by churn probability, when the record carries a balance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_impact: Option<f64>,
}

/// Scaler and classifier pair loaded from one model directory
#[derive(Debug, Clone)]
pub struct ChurnPredictor {
    scaler: StandardScaler,
    model: ChurnModel,
}

impl ChurnPredictor {
    /// Pair a scaler with the classifier fit on its output
    pub fn new(scaler: StandardScaler, model: ChurnModel) -> crate::Result<Self> {
        if scaler.n_features() != model.n_features() {
            return Err(Error::ShapeMismatch {
                expected: scaler.n_features(),
                actual: model.n_features(),
            });
        }
        Ok(Self { scaler, model })
    }

    /// Load both artifacts from `model_dir`
    ///
    /// # Arguments
    /// * `model_dir` - Directory holding `standard_scaler.json` and `churn_model_gb.json`
    ///
    /// # Returns
    /// * A predictor whose scaler and classifier agree on the feature count
    pub fn load(model_dir: &Path) -> crate::Result<Self> {
        let scaler = StandardScaler::load(&model_dir.join(SCALER_FILE_NAME))?;
        let model = ChurnModel::load(&model_dir.join(MODEL_FILE_NAME))?;
        Self::new(scaler, model)
    }

    /// Feature names the record must supply
    pub fn feature_names(&self) -> &[String] {
        &self.scaler.feature_names_in
    }

    /// Churn probability for one record
    pub fn score(&self, record: &Map<String, Value>) -> crate::Result<f64> {
        let aligned = self.scaler.align(record)?;
        let scaled = self.scaler.transform(&aligned)?;
        self.model.predict_proba(&scaled)
    }

    /// Score a record and derive its risk band and revenue impact
    pub fn predict(&self, record: &Map<String, Value>) -> crate::Result<Prediction> {
        let score = self.score(record)?;
        let revenue_impact = record
            .get("balance")
            .and_then(|balance| numeric_value("balance", balance).ok())
            .map(|b| b * score);
        Ok(Prediction { score, risk_level: RiskLevel::from_score(score), revenue_impact })
    }
}
