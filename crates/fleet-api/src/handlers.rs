//! REST API handlers.
//!
//! Each handler checks the whitelist, then makes exactly one store call.

use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::format::format_duration;
use crate::models::{DeviceStatsResponse, HeartbeatRequest, UploadStatsRequest};
use crate::ApiState;

/// Devices do not always send a content type, so bodies are decoded as
/// JSON whatever the header says.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

// ── Heartbeats ─────────────────────────────────────────────────

/// POST /api/v1/devices/:device_id/heartbeat
pub async fn record_heartbeat(
    State(state): State<ApiState>,
    Path(device_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state.ensure_known(&device_id)?;
    let req: HeartbeatRequest = decode(&body)?;

    state.store.record_heartbeat(&device_id, req.sent_at);
    debug!(%device_id, sent_at = %req.sent_at, "heartbeat recorded");
    Ok(StatusCode::NO_CONTENT)
}

// ── Uploads ────────────────────────────────────────────────────

/// POST /api/v1/devices/:device_id/stats
pub async fn record_upload(
    State(state): State<ApiState>,
    Path(device_id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state.ensure_known(&device_id)?;
    let req: UploadStatsRequest = decode(&body)?;
    let nanos = u64::try_from(req.upload_time).map_err(|_| {
        ApiError::InvalidBody(format!("negative upload_time {}", req.upload_time))
    })?;

    state
        .store
        .record_upload(&device_id, req.sent_at, Duration::from_nanos(nanos));
    debug!(%device_id, upload_ns = nanos, "upload recorded");
    Ok(StatusCode::NO_CONTENT)
}

// ── Stats ──────────────────────────────────────────────────────

/// GET /api/v1/devices/:device_id/stats
pub async fn get_stats(
    State(state): State<ApiState>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceStatsResponse>, ApiError> {
    state.ensure_known(&device_id)?;
    let stats = state.store.get_stats(&device_id)?;
    let avg_upload_time = format_duration(stats.average_upload);

    info!(%device_id, uptime = stats.uptime, %avg_upload_time, "device stats");
    if let Some(log) = &state.results {
        log.record(&device_id, &stats).await;
    }

    Ok(Json(DeviceStatsResponse {
        avg_upload_time,
        uptime: stats.uptime,
    }))
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

/// Any unsupported method on a known path.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::response::IntoResponse;
    use chrono::{DateTime, TimeDelta, Utc};
    use fleet_core::DeviceWhitelist;
    use fleet_store::MetricsStore;

    fn test_state() -> ApiState {
        let store = Arc::new(MetricsStore::new());
        store.register_device("dev-1");
        ApiState::new(store).with_whitelist(["dev-1"].into_iter().collect::<DeviceWhitelist>())
    }

    fn base() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn heartbeat(at: DateTime<Utc>) -> Bytes {
        Bytes::from(serde_json::to_vec(&HeartbeatRequest { sent_at: at }).unwrap())
    }

    fn upload(nanos: i64) -> Bytes {
        let req = UploadStatsRequest {
            sent_at: base(),
            upload_time: nanos,
        };
        Bytes::from(serde_json::to_vec(&req).unwrap())
    }

    #[tokio::test]
    async fn heartbeat_is_recorded() {
        let state = test_state();
        let resp = record_heartbeat(State(state.clone()), Path("dev-1".to_string()), heartbeat(base()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.store.heartbeat_count("dev-1"), Some(1));
    }

    #[tokio::test]
    async fn heartbeat_for_unlisted_device() {
        let state = test_state();
        let resp = record_heartbeat(State(state.clone()), Path("rogue".to_string()), heartbeat(base()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(!state.store.contains("rogue"));
    }

    #[tokio::test]
    async fn no_whitelist_accepts_any_device() {
        let state = ApiState::new(Arc::new(MetricsStore::new()));
        let resp = record_heartbeat(State(state.clone()), Path("anyone".to_string()), heartbeat(base()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(state.store.contains("anyone"));
    }

    #[tokio::test]
    async fn upload_is_recorded() {
        let state = test_state();
        let resp = record_upload(State(state.clone()), Path("dev-1".to_string()), upload(1_000_000_000))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.store.upload_count("dev-1"), Some(1));
    }

    #[tokio::test]
    async fn truncated_body_rejected() {
        let state = test_state();
        let resp = record_heartbeat(
            State(state.clone()),
            Path("dev-1".to_string()),
            Bytes::from_static(b"{\"sent_at\":"),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.store.heartbeat_count("dev-1"), Some(0));
    }

    #[tokio::test]
    async fn negative_upload_rejected() {
        let state = test_state();
        let resp = record_upload(State(state.clone()), Path("dev-1".to_string()), upload(-5))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.store.upload_count("dev-1"), Some(0));
    }

    #[tokio::test]
    async fn stats_without_heartbeats_not_found() {
        let state = test_state();
        let resp = get_stats(State(state), Path("dev-1".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats_report_uptime_and_average() {
        let state = test_state();
        for minute in [0, 1, 2, 5] {
            state
                .store
                .record_heartbeat("dev-1", base() + TimeDelta::minutes(minute));
        }
        state.store.record_upload("dev-1", base(), Duration::from_secs(5));
        state.store.record_upload("dev-1", base(), Duration::from_secs(10));

        let Json(body) = get_stats(State(state), Path("dev-1".to_string()))
            .await
            .unwrap();
        assert_eq!(body.uptime, 80.0);
        assert_eq!(body.avg_upload_time, "7.5s");
    }

    #[tokio::test]
    async fn stats_are_appended_to_results_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let log = crate::ResultsLog::open(&path).await.unwrap();
        let state = test_state().with_results_log(log);
        state.store.record_heartbeat("dev-1", base());

        get_stats(State(state), Path("dev-1".to_string())).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[dev-1] uptime 100.000000% | avgUploadTime 0s\n");
    }

    #[tokio::test]
    async fn healthz_ok() {
        assert_eq!(healthz().await, "ok");
    }
}
