//! Churn classifier artifact: tree ensembles and logistic regression

use crate::error::Error;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the classifier artifact inside the model directory
pub const MODEL_FILE_NAME: &str = "churn_model_gb.json";

/// One node of a flattened decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Decision tree stored as a node array rooted at index 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> crate::Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::InvalidArtifact("tree has no nodes".to_string()));
        }
        for node in &self.nodes {
            if let TreeNode::Split { feature, left, right, .. } = *node {
                if feature >= n_features {
                    return Err(Error::InvalidArtifact(format!(
                        "split on feature {feature} but model has {n_features} features"
                    )));
                }
                if left >= self.nodes.len() || right >= self.nodes.len() {
                    return Err(Error::InvalidArtifact(format!(
                        "child index out of range for tree of {} nodes",
                        self.nodes.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf; goes left when `x[feature] <= threshold`
    pub fn evaluate(&self, x: &Array1<f64>) -> crate::Result<f64> {
        let mut index = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return Ok(value),
                TreeNode::Split { feature, threshold, left, right } => {
                    index = if x[feature] <= threshold { left } else { right };
                }
            }
        }
        Err(Error::InvalidArtifact("tree walk did not reach a leaf".to_string()))
    }
}

/// Fitted binary classifier producing a churn probability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChurnModel {
    /// Additive log-odds ensemble
    GradientBoosting {
        n_features: usize,
        learning_rate: f64,
        init_score: f64,
        trees: Vec<DecisionTree>,
    },
    /// Averaged positive-class fractions
    RandomForest {
        n_features: usize,
        trees: Vec<DecisionTree>,
    },
    Logistic {
        coef: Vec<f64>,
        intercept: f64,
    },
}

impl ChurnModel {
    /// Load and validate a classifier artifact
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Err(Error::ArtifactMissing { path: path.to_path_buf() });
        }
        let model: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> crate::Result<()> {
        match self {
            ChurnModel::GradientBoosting { n_features, trees, .. }
            | ChurnModel::RandomForest { n_features, trees } => {
                if trees.is_empty() {
                    return Err(Error::InvalidArtifact("ensemble has no trees".to_string()));
                }
                trees.iter().try_for_each(|tree| tree.validate(*n_features))
            }
            ChurnModel::Logistic { coef, .. } if coef.is_empty() => {
                Err(Error::InvalidArtifact("logistic model has no coefficients".to_string()))
            }
            ChurnModel::Logistic { .. } => Ok(()),
        }
    }

    /// Number of features the model was fit on
    pub fn n_features(&self) -> usize {
        match self {
            ChurnModel::GradientBoosting { n_features, .. }
            | ChurnModel::RandomForest { n_features, .. } => *n_features,
            ChurnModel::Logistic { coef, .. } => coef.len(),
        }
    }

    /// Probability of the positive (churn) class, in `[0, 1]`
    pub fn predict_proba(&self, x: &Array1<f64>) -> crate::Result<f64> {
        if x.len() != self.n_features() {
            return Err(Error::ShapeMismatch { expected: self.n_features(), actual: x.len() });
        }

        let probability = match self {
            ChurnModel::GradientBoosting { learning_rate, init_score, trees, .. } => {
                let mut raw = *init_score;
                for tree in trees {
                    raw += learning_rate * tree.evaluate(x)?;
                }
                sigmoid(raw)
            }
            ChurnModel::RandomForest { trees, .. } => {
                let mut total = 0.0;
                for tree in trees {
                    total += tree.evaluate(x)?;
                }
                (total / trees.len() as f64).clamp(0.0, 1.0)
            }
            ChurnModel::Logistic { coef, intercept } => {
                let logit: f64 = coef.iter().zip(x.iter()).map(|(w, v)| w * v).sum();
                sigmoid(logit + intercept)
            }
        };

        if probability.is_nan() {
            return Err(Error::InvalidArtifact("model produced a NaN probability".to_string()));
        }
        Ok(probability)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
