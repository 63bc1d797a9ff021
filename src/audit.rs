//! Data-quality audit: missing rates, z-score outliers and a weighted health score
//!
//! The health score weights are 0.4 completeness, 0.3 integrity and 0.3
//! validity. Integrity is not clamped: a dataset dense with outliers can drive
//! it (and therefore the health score) below zero.

use crate::data::MemberTable;
use serde::{Deserialize, Serialize};

/// Numeric columns scanned for z-score outliers, when present
pub const OUTLIER_COLUMNS: [&str; 7] = [
    "credit_score",
    "age",
    "tenure",
    "balance",
    "products_number",
    "estimated_salary",
    "engagement_score",
];

/// Absolute z-score above which a value counts as an outlier
pub const Z_THRESHOLD: f64 = 3.0;

/// Members younger than this fail the validity check
pub const MINIMUM_AGE: f64 = 18.0;

const COMPLETENESS_WEIGHT: f64 = 0.4;
const INTEGRITY_WEIGHT: f64 = 0.3;
const VALIDITY_WEIGHT: f64 = 0.3;

/// Quality tier assigned to each column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityTier {
    High,
    Medium,
    Critical,
}

impl QualityTier {
    /// Classify a column from its missing rate and outlier count
    pub fn classify(missing_pct: f64, outliers: usize, rows: usize) -> Self {
        if missing_pct == 0.0 && (outliers as f64) < rows as f64 * 0.01 {
            QualityTier::High
        } else if missing_pct < 5.0 {
            QualityTier::Medium
        } else {
            QualityTier::Critical
        }
    }
}

/// Treatment recommended for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Treatment {
    Verified,
    #[serde(rename = "Capping/Winsorization")]
    Capping,
}

impl Treatment {
    pub fn for_column(missing: usize, outliers: usize) -> Self {
        if missing == 0 && outliers == 0 {
            Treatment::Verified
        } else {
            Treatment::Capping
        }
    }
}

/// Audit result for one column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureAudit {
    pub field: String,
    /// Display form of the missing rate, e.g. `"0.0%"`
    pub missing: String,
    pub missing_pct: f64,
    pub outliers: usize,
    pub quality: QualityTier,
    pub treatment: Treatment,
}

/// Aggregate quality dimensions, each on a 0–100 scale
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub completeness: f64,
    pub integrity: f64,
    pub validity: f64,
}

impl QualityMetrics {
    pub fn health_score(&self) -> f64 {
        COMPLETENESS_WEIGHT * self.completeness
            + INTEGRITY_WEIGHT * self.integrity
            + VALIDITY_WEIGHT * self.validity
    }
}

/// Full audit report, recomputed on every call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub health_score: f64,
    pub metrics: QualityMetrics,
    pub total_records: usize,
    pub features: Vec<FeatureAudit>,
}

/// Count values whose absolute z-score exceeds [`Z_THRESHOLD`]
///
/// Missing values are skipped. Uses the sample standard deviation; a column
/// with fewer than two values or zero spread has no outliers.
pub fn count_outliers(values: &[Option<f64>]) -> usize {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let Some(std_dev) = sample_std(&present) else {
        return 0;
    };
    if std_dev == 0.0 {
        return 0;
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    present.iter().filter(|&&x| ((x - mean) / std_dev).abs() > Z_THRESHOLD).count()
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Audit every column of the table
///
/// # Arguments
/// * `table` - Member dataset as read from disk, without coercion
///
/// # Returns
/// * `AuditReport` with one entry per column and the weighted health score
pub fn audit_members(table: &MemberTable) -> crate::Result<AuditReport> {
    let rows = table.row_count();
    let mut features = Vec::new();
    let mut total_outliers = 0usize;
    let mut scanned_columns = 0usize;

    for name in table.column_names() {
        let missing = table.missing_count(&name)?;
        let missing_pct = percentage(missing, rows);

        let outliers = if OUTLIER_COLUMNS.contains(&name.as_str()) {
            scanned_columns += 1;
            count_outliers(&table.numeric(&name)?)
        } else {
            0
        };
        total_outliers += outliers;

        features.push(FeatureAudit {
            missing: format!("{missing_pct:.1}%"),
            missing_pct,
            outliers,
            quality: QualityTier::classify(missing_pct, outliers, rows),
            treatment: Treatment::for_column(missing, outliers),
            field: name,
        });
    }

    let mean_missing = if features.is_empty() {
        0.0
    } else {
        features.iter().map(|f| f.missing_pct).sum::<f64>() / features.len() as f64
    };
    let completeness = 100.0 - mean_missing;
    let integrity = 100.0 - percentage(total_outliers, scanned_columns * rows);

    let underage = table
        .numeric_or_missing("age")?
        .into_iter()
        .filter(|age| matches!(age, Some(a) if *a < MINIMUM_AGE))
        .count();
    let validity = 100.0 - percentage(underage, rows);

    let metrics = QualityMetrics {
        completeness: round2(completeness),
        integrity: round2(integrity),
        validity: round2(validity),
    };

    tracing::debug!(rows, total_outliers, scanned_columns, "audit computed");

    Ok(AuditReport {
        health_score: round2(
            QualityMetrics { completeness, integrity, validity }.health_score(),
        ),
        metrics,
        total_records: rows,
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_members;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table_from(lines: &[&str]) -> MemberTable {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        read_members(file.path()).unwrap()
    }

    fn feature<'a>(report: &'a AuditReport, name: &str) -> &'a FeatureAudit {
        report.features.iter().find(|f| f.field == name).unwrap()
    }

    #[test]
    fn test_fully_missing_column_is_critical() {
        let table = table_from(&["age,notes", "30,", "40,", "50,"]);
        let report = audit_members(&table).unwrap();

        let notes = feature(&report, "notes");
        assert_eq!(notes.missing_pct, 100.0);
        assert_eq!(notes.missing, "100.0%");
        assert_eq!(notes.quality, QualityTier::Critical);
        assert_eq!(notes.treatment, Treatment::Capping);

        let age = feature(&report, "age");
        assert_eq!(age.missing, "0.0%");
        assert_eq!(age.quality, QualityTier::High);
        assert_eq!(age.treatment, Treatment::Verified);
    }

    #[test]
    fn test_na_tokens_count_as_missing() {
        let table = table_from(&["age,tenure", "30,1", "NA,2", "45,NaN"]);
        let report = audit_members(&table).unwrap();

        for name in ["age", "tenure"] {
            let column = feature(&report, name);
            assert_eq!(column.missing, "33.3%");
            assert_eq!(column.quality, QualityTier::Critical);
        }
    }

    #[test]
    fn test_health_score_weights() {
        // 1 of 4 ages missing, one underage member, no outliers possible
        let table = table_from(&["age,balance", "17,10", "30,20", ",30", "45,40"]);
        let report = audit_members(&table).unwrap();

        assert_eq!(report.total_records, 4);
        assert!((report.metrics.completeness - 87.5).abs() < 1e-9);
        assert!((report.metrics.integrity - 100.0).abs() < 1e-9);
        assert!((report.metrics.validity - 75.0).abs() < 1e-9);
        let expected = 0.4 * 87.5 + 0.3 * 100.0 + 0.3 * 75.0;
        assert!((report.health_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_medium_tier_for_small_gaps() {
        let mut lines = vec!["tenure,member".to_string()];
        lines.extend((0..49).map(|i| format!("{},{i}", i % 10)));
        lines.push(",49".to_string());
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let report = audit_members(&table_from(&refs)).unwrap();

        let tenure = feature(&report, "tenure");
        assert!((tenure.missing_pct - 2.0).abs() < 1e-9);
        assert_eq!(tenure.quality, QualityTier::Medium);
    }

    #[test]
    fn test_count_outliers_detects_extreme_value() {
        let mut values: Vec<Option<f64>> = (0..30).map(|i| Some(f64::from(i % 3))).collect();
        values.push(Some(1_000.0));
        values.push(None);
        assert_eq!(count_outliers(&values), 1);
    }

    #[test]
    fn test_count_outliers_zero_spread() {
        let values = vec![Some(5.0); 10];
        assert_eq!(count_outliers(&values), 0);
        assert_eq!(count_outliers(&[Some(1.0)]), 0);
        assert_eq!(count_outliers(&[]), 0);
    }

    #[test]
    fn test_outliers_only_counted_for_scanned_columns() {
        let mut lines = vec!["balance,other".to_string()];
        lines.extend((0..30).map(|i| format!("{},{}", i % 3, i % 3)));
        lines.push("100000,100000".to_string());
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let report = audit_members(&table_from(&refs)).unwrap();

        assert_eq!(feature(&report, "balance").outliers, 1);
        assert_eq!(feature(&report, "balance").quality, QualityTier::Medium);
        assert_eq!(feature(&report, "other").outliers, 0);
        let expected_integrity = 100.0 - 1.0 / 31.0 * 100.0;
        assert!((report.metrics.integrity - round2(expected_integrity)).abs() < 1e-9);
    }

    #[test]
    fn test_quality_tier_thresholds() {
        assert_eq!(QualityTier::classify(0.0, 0, 100), QualityTier::High);
        assert_eq!(QualityTier::classify(0.0, 1, 100), QualityTier::Medium);
        assert_eq!(QualityTier::classify(4.9, 0, 100), QualityTier::Medium);
        assert_eq!(QualityTier::classify(5.0, 0, 100), QualityTier::Critical);
    }

    #[test]
    fn test_treatment_serializes_label() {
        let json = serde_json::to_string(&Treatment::Capping).unwrap();
        assert_eq!(json, "\"Capping/Winsorization\"");
    }
}
