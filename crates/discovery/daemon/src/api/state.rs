//! Application state for API handlers

use std::sync::Arc;

use tokio::sync::watch;

use crate::engine::DiscoveryEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Run builder shared by all requests
    pub engine: Arc<DiscoveryEngine>,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// Flips to `true` when the daemon shuts down; in-flight runs cancel
    pub shutdown_rx: watch::Receiver<bool>,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: Arc<DiscoveryEngine>, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            engine,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
            shutdown_rx,
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let duration = chrono::Utc::now() - self.started_at;
        let secs = duration.num_seconds();
        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        }
    }
}
