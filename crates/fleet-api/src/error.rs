//! API error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleet_store::StoreError;
use thiserror::Error;
use tracing::debug;

use crate::models::ErrorBody;

/// Errors returned by the device handlers.
///
/// The published contract documents only 404 and 500, so malformed
/// bodies map to 500 rather than 400.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected at the whitelist before reaching the store.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The store has nothing to report for this device.
    #[error("no stats for device: {0}")]
    NoStats(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::DeviceNotFound(device_id) => {
                debug!(%device_id, "device not found");
                (StatusCode::NOT_FOUND, "device not found")
            }
            ApiError::NoStats(device_id) => {
                debug!(%device_id, "no stats to report");
                (StatusCode::NOT_FOUND, "Device not found")
            }
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
            ApiError::InvalidBody(reason) => {
                debug!(%reason, "rejected request body");
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid request body")
            }
        };
        (
            status,
            Json(ErrorBody {
                msg: msg.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // Both store errors mean "nothing to report" at the boundary.
        ApiError::NoStats(err.device_id().to_string())
    }
}
