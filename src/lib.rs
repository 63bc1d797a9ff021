//! Churnlens: member churn analytics backend
//!
//! Loads a member dataset, scores churn risk with a pre-trained classifier,
//! projects members into persona segments, audits data quality and serves
//! all of it over a JSON API.

pub mod audit;
pub mod cli;
pub mod data;
pub mod error;
pub mod insights;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod portfolio;
pub mod predict;
pub mod scaler;
pub mod segmentation;
pub mod server;
pub mod viz;

// Re-export public items for easier access
pub use audit::{audit_members, AuditReport, QualityTier};
pub use cli::Args;
pub use data::{load_members, read_members, MemberTable};
pub use error::Error;
pub use insights::ModelInsights;
pub use ledger::{build_ledger, LedgerEntry};
pub use portfolio::{members_overview, MembersOverview, PortfolioMetrics};
pub use predict::{ChurnPredictor, Prediction, RiskLevel};
pub use segmentation::{segment_members, ClusterPersonas, SegmentPoint};
pub use viz::render_segmentation;

/// Common result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
