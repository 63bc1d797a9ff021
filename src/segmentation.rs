//! Segmentation projection: standardize, reduce to two PCA components, label personas

use crate::data::MemberTable;
use crate::error::Error;
use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_reduction::Pca;
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Columns fed to the projection, in order
pub const PROJECTION_FEATURES: [&str; 6] = [
    "credit_score",
    "age",
    "balance",
    "products_number",
    "estimated_salary",
    "engagement_score",
];

/// Persona used when a row has no recognised cluster id
pub const FALLBACK_PERSONA: &str = "General Portfolio";

/// Mapping from cluster id to a human-readable persona
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterPersonas {
    labels: BTreeMap<i64, String>,
}

impl Default for ClusterPersonas {
    fn default() -> Self {
        let labels = [
            (0, "Stable Savers"),
            (1, "Wealth Builders"),
            (2, "High Value At Risk"),
            (3, "Disengaged Youth"),
            (4, "Pre-Retirees"),
        ]
        .into_iter()
        .map(|(id, label)| (id, label.to_string()))
        .collect();
        Self { labels }
    }
}

impl ClusterPersonas {
    /// Persona for a raw cluster cell; non-integral or unknown ids fall back
    pub fn label(&self, cluster: Option<f64>) -> &str {
        cluster
            .filter(|id| id.fract() == 0.0)
            .and_then(|id| self.labels.get(&(id as i64)))
            .map(String::as_str)
            .unwrap_or(FALLBACK_PERSONA)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// One projected member, named for the dashboard scatter plot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentPoint {
    #[serde(rename = "pcaX")]
    pub pca_x: f64,
    #[serde(rename = "pcaY")]
    pub pca_y: f64,
    pub segment: String,
    #[serde(rename = "superBalance")]
    pub super_balance: Option<f64>,
    pub age: Option<f64>,
    #[serde(rename = "churnProbability")]
    pub churn_probability: Option<f64>,
    #[serde(rename = "appSessionsPerMonth")]
    pub app_sessions_per_month: Option<f64>,
}

/// Zero-mean, unit-variance scaling fit on the given matrix
///
/// Uses the population standard deviation; constant columns are centered only.
pub fn standardize(records: &Array2<f64>) -> Array2<f64> {
    let n = records.nrows();
    if n == 0 {
        return records.clone();
    }
    let mean = records.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(records.ncols()));
    let std = records.std_axis(Axis(0), 0.0).mapv(|s| if s == 0.0 { 1.0 } else { s });
    (records - &mean) / &std
}

/// Project rows onto their first two principal components
///
/// Fewer than two rows, or a matrix with no spread, map to the origin. When the
/// data has rank below two the missing components are zero-filled, so the
/// result is always `(n, 2)`.
pub fn project_2d(records: &Array2<f64>) -> crate::Result<Array2<f64>> {
    let n = records.nrows();
    if n < 2 || records.iter().all(|v| v.abs() < f64::EPSILON) {
        return Ok(Array2::zeros((n, 2)));
    }

    let dataset = DatasetBase::from(records.clone());
    let pca = Pca::params(2)
        .fit(&dataset)
        .map_err(|e| Error::Projection(e.to_string()))?;
    tracing::debug!(explained = ?pca.explained_variance_ratio(), "fitted projection");

    let embedding: Array2<f64> = pca.predict(records);
    let mut coords = Array2::zeros((n, 2));
    let kept = embedding.ncols().min(2);
    if kept < 2 {
        tracing::debug!(components = kept, "rank-deficient projection, padding with zeros");
    }
    coords
        .slice_mut(s![.., ..kept])
        .assign(&embedding.slice(s![.., ..kept]).mapv(|v| if v.is_finite() { v } else { 0.0 }));
    Ok(coords)
}

/// Build the projection feature matrix, filling gaps with zero
fn projection_matrix(table: &MemberTable) -> crate::Result<Array2<f64>> {
    let rows = table.row_count();
    let mut matrix = Array2::zeros((rows, PROJECTION_FEATURES.len()));
    for (col, name) in PROJECTION_FEATURES.iter().enumerate() {
        let values = table.numeric_filled(name, 0.0)?;
        for (row, value) in values.into_iter().enumerate() {
            matrix[[row, col]] = value;
        }
    }
    Ok(matrix)
}

/// Project every member to 2-D and attach its persona
///
/// Gaps in the projection features are zero-filled for the PCA fit only; the
/// reported balance, age, churn and engagement keep their missing values.
///
/// # Arguments
/// * `table` - Member dataset; must carry every column in [`PROJECTION_FEATURES`]
/// * `personas` - Cluster id to persona mapping
///
/// # Returns
/// * One [`SegmentPoint`] per row, in row order
pub fn segment_members(
    table: &MemberTable,
    personas: &ClusterPersonas,
) -> crate::Result<Vec<SegmentPoint>> {
    let scaled = standardize(&projection_matrix(table)?);
    let coords = project_2d(&scaled)?;

    let clusters = table.numeric_or_missing("cluster")?;
    let balance = table.numeric_or_missing("balance")?;
    let age = table.numeric_or_missing("age")?;
    let churn = table.numeric_or_missing("churn")?;
    let engagement = table.numeric_or_missing("engagement_score")?;

    let points = coords
        .outer_iter()
        .enumerate()
        .map(|(i, xy)| SegmentPoint {
            pca_x: xy[0],
            pca_y: xy[1],
            segment: personas.label(clusters[i]).to_string(),
            super_balance: balance[i],
            age: age[i],
            churn_probability: churn[i],
            app_sessions_per_month: engagement[i],
        })
        .collect();

    Ok(points)
}
