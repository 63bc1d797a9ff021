//! Portfolio summary for the member listing: AUM, value at risk, churn correlations

use crate::data::MemberTable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Headline portfolio metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Sum of member balances
    pub total_aum: f64,
    /// Sum of balances held by churned members
    pub total_var: f64,
    pub churn_rate: f64,
}

/// Payload of `GET /api/members`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembersOverview {
    pub members: Vec<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlations: Option<BTreeMap<String, f64>>,
    pub metrics: PortfolioMetrics,
}

/// Compute headline metrics; expects `balance` and `churn` already coerced
pub fn portfolio_metrics(table: &MemberTable) -> crate::Result<PortfolioMetrics> {
    let balance = table.numeric_filled("balance", 0.0)?;
    let churn = table.numeric_filled("churn", 0.0)?;

    let total_aum = balance.iter().sum();
    let total_var = balance.iter().zip(&churn).map(|(b, c)| b * c).sum();
    let churn_rate = if churn.is_empty() {
        0.0
    } else {
        churn.iter().sum::<f64>() / churn.len() as f64
    };

    Ok(PortfolioMetrics { total_aum, total_var, churn_rate })
}

/// Pearson correlation over pairs where both values are present
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> =
        xs.iter().zip(ys).filter_map(|(x, y)| Some(((*x)?, (*y)?))).collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Correlation of every numeric column with `churn`
///
/// Non-numeric and constant columns are left out; `None` when nothing qualifies.
pub fn churn_correlations(table: &MemberTable) -> crate::Result<Option<BTreeMap<String, f64>>> {
    if !table.has_column("churn") {
        return Ok(None);
    }
    let churn = table.numeric("churn")?;

    let mut correlations = BTreeMap::new();
    for name in table.column_names() {
        if name == "churn" {
            continue;
        }
        let values = table.numeric(&name)?;
        if let Some(r) = pearson(&values, &churn) {
            correlations.insert(name, r);
        }
    }

    Ok((!correlations.is_empty()).then_some(correlations))
}

/// Assemble the member listing payload
pub fn members_overview(table: &MemberTable) -> crate::Result<MembersOverview> {
    Ok(MembersOverview {
        members: table.records(),
        correlations: churn_correlations(table)?,
        metrics: portfolio_metrics(table)?,
    })
}
