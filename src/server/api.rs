//! API router and server setup
//!
//! Configures axum routes and runs the HTTP server.

use crate::server::{
    handlers::{
        get_audit, get_member_ledger, get_members, get_model_insights, get_segmentation,
        health_check, predict,
    },
    state::AppState,
    ServerConfig,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Analytics API server
pub struct ChurnServer {
    config: ServerConfig,
    state: AppState,
}

impl ChurnServer {
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState::new(config.clone());
        Self { config, state }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let mut app = Router::new()
            .route("/health", get(health_check))
            .route("/api/members", get(get_members))
            .route("/api/predict", post(predict))
            .route("/api/model-insights", get(get_model_insights))
            .route("/api/segmentation", get(get_segmentation))
            .route("/api/audit", get(get_audit))
            .route("/api/member-ledger", get(get_member_ledger))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors_enabled {
            let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Bind and serve until the process is stopped
    pub async fn run(&self) -> std::io::Result<()> {
        let addr = self.config.address;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, data = %self.config.data_path.display(), "churnlens server listening");

        axum::serve(listener, self.router()).await
    }

    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Get the current state (for testing)
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

// =============================================================================
// Tests
// =============================================================================
