//! Request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /devices/{device_id}/heartbeat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub sent_at: DateTime<Utc>,
}

/// Body of `POST /devices/{device_id}/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadStatsRequest {
    pub sent_at: DateTime<Utc>,
    /// Upload duration in nanoseconds.
    pub upload_time: i64,
}

/// Body of `GET /devices/{device_id}/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatsResponse {
    /// Rendered as e.g. `7.5s` or `5m10s`.
    pub avg_upload_time: String,
    pub uptime: f64,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub msg: String,
}
