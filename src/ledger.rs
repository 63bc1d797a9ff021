//! Member ledger: display-ready rows with generated references and names

use crate::data::MemberTable;
use crate::segmentation::ClusterPersonas;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

const FIRST_NAMES: [&str; 16] = [
    "Olivia", "Liam", "Charlotte", "Noah", "Amelia", "Jack", "Isla", "William", "Mia", "Oliver",
    "Ava", "Henry", "Grace", "Leo", "Chloe", "Thomas",
];

const LAST_NAMES: [&str; 16] = [
    "Smith", "Jones", "Williams", "Brown", "Wilson", "Taylor", "Nguyen", "Johnson", "Martin",
    "White", "Anderson", "Walker", "Thompson", "Kelly", "Harris", "Ryan",
];

/// One row of the member ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub name: String,
    pub country: String,
    pub balance: f64,
    pub products: Option<f64>,
    pub churn: f64,
    /// Persona label of the member's cluster
    pub cluster: String,
    pub salary: Option<f64>,
    pub age: Option<f64>,
    pub tenure: Option<f64>,
    pub engagement: Option<f64>,
    pub credit_card: String,
    pub active: String,
}

/// Ledger reference for a zero-based row position
pub fn member_id(row: usize) -> String {
    format!("MBR-{:05}", row + 1)
}

/// Display name seeded by row position, so repeated calls agree
pub fn display_name(row: usize) -> String {
    let mut rng = StdRng::seed_from_u64(row as u64);
    let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Member");
    let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Unknown");
    format!("{first} {last}")
}

/// Country from the one-hot indicator columns; France is the baseline category
fn country(germany: Option<f64>, spain: Option<f64>) -> &'static str {
    if germany == Some(1.0) {
        "Germany"
    } else if spain == Some(1.0) {
        "Spain"
    } else {
        "France"
    }
}

fn yes_no(flag: Option<f64>) -> String {
    if flag == Some(1.0) { "Yes" } else { "No" }.to_string()
}

/// Build one ledger entry per member row
pub fn build_ledger(
    table: &MemberTable,
    personas: &ClusterPersonas,
) -> crate::Result<Vec<LedgerEntry>> {
    let column = |name: &str| table.numeric_or_missing(name);

    let germany = column("country_Germany")?;
    let spain = column("country_Spain")?;
    let balance = column("balance")?;
    let products = column("products_number")?;
    let churn = column("churn")?;
    let clusters = column("cluster")?;
    let salary = column("estimated_salary")?;
    let age = column("age")?;
    let tenure = column("tenure")?;
    let engagement = column("engagement_score")?;
    let credit_card = column("credit_card")?;
    let active = column("active_member")?;

    let entries = (0..table.row_count())
        .map(|i| LedgerEntry {
            id: member_id(i),
            name: display_name(i),
            country: country(germany[i], spain[i]).to_string(),
            balance: balance[i].unwrap_or(0.0),
            products: products[i],
            churn: churn[i].unwrap_or(0.0),
            cluster: personas.label(clusters[i]).to_string(),
            salary: salary[i],
            age: age[i],
            tenure: tenure[i],
            engagement: engagement[i],
            credit_card: yes_no(credit_card[i]),
            active: yes_no(active[i]),
        })
        .collect();

    Ok(entries)
}
