//! REST/JSON API server
//!
//! Serves the member dataset, churn scoring, model report card, segmentation
//! projection and data-quality audit. Every request reads its inputs fresh
//! from disk; nothing is cached between requests.
//!
//! # Example
//!
//! ```ignore
//! use churnlens::server::{ChurnServer, ServerConfig};
//!
//! let server = ChurnServer::new(ServerConfig::default());
//! server.run().await?;
//! ```

mod api;
mod handlers;
mod state;

pub use api::*;
pub use handlers::*;
pub use state::*;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub address: SocketAddr,
    /// Member dataset (CSV)
    pub data_path: PathBuf,
    /// Directory holding the scaler and classifier artifacts
    pub model_dir: PathBuf,
    /// Permissive CORS for browser dashboards
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([0, 0, 0, 0], 8000)),
            data_path: PathBuf::from("data/processed/segmented_members_final.csv"),
            model_dir: PathBuf::from("models"),
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    pub fn with_address(mut self, addr: SocketAddr) -> Self {
        self.address = addr;
        self
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    /// Disable CORS
    pub fn without_cors(mut self) -> Self {
        self.cors_enabled = false;
        self
    }
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Endpoint failure carrying its HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    /// Server-side failure; the message is passed through unchanged
    pub fn internal(err: impl std::fmt::Display) -> Self {
        let detail = err.to_string();
        tracing::error!(%detail, "request failed");
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, detail }
    }

    /// Any failure while scoring a record is reported as a client error
    pub fn prediction(err: impl std::fmt::Display) -> Self {
        let detail = format!("Prediction Failure: {err}");
        tracing::warn!(%detail, "prediction rejected");
        Self { status: StatusCode::BAD_REQUEST, detail }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}
