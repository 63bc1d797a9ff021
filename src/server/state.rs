//! Server application state
//!
//! Read-only configuration shared by every request: the resolved paths,
//! the cluster persona map and the model report card.

use crate::insights::ModelInsights;
use crate::segmentation::ClusterPersonas;
use crate::server::ServerConfig;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub personas: Arc<ClusterPersonas>,
    pub insights: Arc<ModelInsights>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            personas: Arc::new(ClusterPersonas::default()),
            insights: Arc::new(ModelInsights::canonical()),
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
