//! HTTP request handlers
//!
//! Axum handlers for the analytics API. Dataset and artifact reads are
//! blocking, so each handler runs its work on the blocking pool.

use crate::audit::{audit_members, AuditReport};
use crate::data::{load_members, read_members};
use crate::insights::ModelInsights;
use crate::ledger::{build_ledger, LedgerEntry};
use crate::portfolio::{members_overview, MembersOverview};
use crate::predict::{ChurnPredictor, Prediction};
use crate::segmentation::{segment_members, SegmentPoint};
use crate::server::{state::AppState, ApiError, HealthResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{Map, Value};

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Run blocking work off the async runtime
async fn run_blocking<T, F>(task: F) -> std::result::Result<crate::Result<T>, ApiError>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(ApiError::internal)
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
    };
    (StatusCode::OK, Json(health))
}

/// List members with portfolio metrics
pub async fn get_members(State(state): State<AppState>) -> ApiResult<MembersOverview> {
    let path = state.config.data_path.clone();
    let overview = run_blocking(move || members_overview(&load_members(&path)?))
        .await?
        .map_err(ApiError::internal)?;
    tracing::info!(members = overview.members.len(), "served member listing");
    Ok(Json(overview))
}

/// Score a single member record
pub async fn predict(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<Prediction> {
    let Json(record) = payload.map_err(|rejection| ApiError::prediction(rejection.body_text()))?;
    let model_dir = state.config.model_dir.clone();

    let prediction = run_blocking(move || ChurnPredictor::load(&model_dir)?.predict(&record))
        .await?
        .map_err(ApiError::prediction)?;
    tracing::debug!(score = prediction.score, "scored member");
    Ok(Json(prediction))
}

/// Static model evaluation report
pub async fn get_model_insights(State(state): State<AppState>) -> Json<ModelInsights> {
    Json(state.insights.as_ref().clone())
}

/// 2-D projection of every member, labelled by persona
///
/// Reads the raw dataset so missing balance and churn stay `null`.
pub async fn get_segmentation(State(state): State<AppState>) -> ApiResult<Vec<SegmentPoint>> {
    let path = state.config.data_path.clone();
    let personas = state.personas.clone();
    let points = run_blocking(move || segment_members(&read_members(&path)?, &personas))
        .await?
        .map_err(ApiError::internal)?;
    Ok(Json(points))
}

/// Data-quality audit over the raw dataset
pub async fn get_audit(State(state): State<AppState>) -> ApiResult<AuditReport> {
    let path = state.config.data_path.clone();
    let report = run_blocking(move || audit_members(&read_members(&path)?))
        .await?
        .map_err(ApiError::internal)?;
    tracing::info!(health_score = report.health_score, "audit completed");
    Ok(Json(report))
}

/// Display-ready member ledger
pub async fn get_member_ledger(State(state): State<AppState>) -> ApiResult<Vec<LedgerEntry>> {
    let path = state.config.data_path.clone();
    let personas = state.personas.clone();
    let ledger = run_blocking(move || build_ledger(&load_members(&path)?, &personas))
        .await?
        .map_err(ApiError::internal)?;
    Ok(Json(ledger))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerConfig;
    use serde_json::json;
    use std::path::PathBuf;

    fn fixture(path: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
    }

    fn test_state() -> AppState {
        AppState::new(
            ServerConfig::default()
                .with_data_path(fixture("data/processed/segmented_members_final.csv"))
                .with_model_dir(fixture("models")),
        )
    }

    fn missing_data_state() -> AppState {
        let dir = std::env::temp_dir().join("churnlens-absent");
        AppState::new(
            ServerConfig::default()
                .with_data_path(dir.join("members.csv"))
                .with_model_dir(dir.join("models")),
        )
    }

    fn sample_record() -> Map<String, Value> {
        json!({
            "credit_score": 619, "age": 42, "tenure": 2, "balance": 0.0,
            "products_number": 1, "credit_card": 1, "active_member": 1,
            "estimated_salary": 101348.88, "balance_salary_ratio": 0.0,
            "tenure_age_ratio": 0.047, "engagement_score": 2, "is_zero_balance": 1,
            "country_Germany": 0, "country_Spain": 0, "gender": 0,
            "grp_Adult": 1, "grp_Mid_Age": 0, "grp_Senior": 0, "cluster": 1
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, Json(body)) = health_check(State(test_state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");
    }

    #[tokio::test]
    async fn test_get_members() {
        let Json(overview) = get_members(State(test_state())).await.unwrap();
        assert_eq!(overview.members.len(), 20);
        assert!(overview.metrics.total_aum > overview.metrics.total_var);
        assert!((0.0..=1.0).contains(&overview.metrics.churn_rate));
        assert!(overview.correlations.is_some());
    }

    #[tokio::test]
    async fn test_get_members_missing_dataset() {
        let err = get_members(State(missing_data_state())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.detail.contains("Dataset missing"));
    }

    #[tokio::test]
    async fn test_predict() {
        let Json(prediction) =
            predict(State(test_state()), Ok(Json(sample_record()))).await.unwrap();
        assert!((0.0..=1.0).contains(&prediction.score));
    }

    #[tokio::test]
    async fn test_predict_missing_feature() {
        let mut record = sample_record();
        record.remove("tenure");

        let err = predict(State(test_state()), Ok(Json(record))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.detail.starts_with("Prediction Failure:"));
        assert!(err.detail.contains("tenure"));
    }

    #[tokio::test]
    async fn test_predict_missing_artifacts() {
        let err = predict(State(missing_data_state()), Ok(Json(sample_record())))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_model_insights() {
        let Json(insights) = get_model_insights(State(test_state())).await;
        assert_eq!(insights.confusion_matrix.tp, 253);
    }

    #[tokio::test]
    async fn test_get_segmentation() {
        let Json(points) = get_segmentation(State(test_state())).await.unwrap();
        assert_eq!(points.len(), 20);
        assert_eq!(points[0].segment, "High Value At Risk");
    }

    #[tokio::test]
    async fn test_get_audit() {
        let Json(report) = get_audit(State(test_state())).await.unwrap();
        assert_eq!(report.total_records, 20);
        assert_eq!(report.features.len(), 20);
        assert!(report.health_score > 90.0);
    }

    #[tokio::test]
    async fn test_get_member_ledger() {
        let Json(ledger) = get_member_ledger(State(test_state())).await.unwrap();
        assert_eq!(ledger.len(), 20);
        assert_eq!(ledger[1].country, "Spain");
    }
}
