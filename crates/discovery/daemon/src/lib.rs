//! Front end for the discovery engine.
//!
//! Exposes discovery runs over HTTP (`POST /api/v1/process`) and as a
//! one-shot command, with configuration layered from defaults, an optional
//! file and `DISCOVERY_*` environment variables.

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod server;

// ── Re-exports ──────────────────────────────────────────────────────

pub use api::{create_router, AppState};
pub use config::{DaemonConfig, LoggingConfig, ServerConfig};
pub use engine::{DiscoveryEngine, DiscoveryRequest};
pub use error::{ApiError, ApiResult, DaemonError, DaemonResult};
pub use server::Server;
