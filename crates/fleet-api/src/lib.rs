//! fleet-api — REST API for the device fleet.
//!
//! Decodes device reports into metrics-store calls and encodes the
//! derived stats. Whitelist enforcement lives here, not in the store.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/v1/devices/{device_id}/heartbeat` | Record a heartbeat |
//! | POST | `/api/v1/devices/{device_id}/stats` | Record an upload duration |
//! | GET | `/api/v1/devices/{device_id}/stats` | Uptime and average upload time |
//! | GET | `/healthz` | Liveness probe |

pub mod error;
pub mod format;
pub mod handlers;
pub mod models;
pub mod results_log;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use fleet_core::DeviceWhitelist;
use fleet_store::MetricsStore;

pub use error::ApiError;
pub use format::format_duration;
pub use results_log::ResultsLog;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<MetricsStore>,
    /// When set, requests for unlisted devices are rejected with 404.
    pub whitelist: Option<Arc<DeviceWhitelist>>,
    pub results: Option<Arc<ResultsLog>>,
}

impl ApiState {
    pub fn new(store: Arc<MetricsStore>) -> Self {
        Self {
            store,
            whitelist: None,
            results: None,
        }
    }

    pub fn with_whitelist(mut self, whitelist: DeviceWhitelist) -> Self {
        self.whitelist = Some(Arc::new(whitelist));
        self
    }

    pub fn with_results_log(mut self, log: ResultsLog) -> Self {
        self.results = Some(Arc::new(log));
        self
    }

    pub(crate) fn ensure_known(&self, device_id: &str) -> Result<(), ApiError> {
        match &self.whitelist {
            Some(list) if !list.contains(device_id) => {
                Err(ApiError::DeviceNotFound(device_id.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/devices/{device_id}/heartbeat", post(handlers::record_heartbeat))
        .route(
            "/devices/{device_id}/stats",
            get(handlers::get_stats).post(handlers::record_upload),
        )
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/healthz", get(handlers::healthz))
        .method_not_allowed_fallback(handlers::method_not_allowed)
}
