//! Error types for the metrics store.

use thiserror::Error;

/// Result type alias for store reads.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by [`crate::MetricsStore::get_stats`].
///
/// Writes are total; only stat reads can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("no heartbeats recorded for device: {0}")]
    NoHeartbeats(String),
}

impl StoreError {
    /// The device ID the error refers to.
    pub fn device_id(&self) -> &str {
        match self {
            StoreError::DeviceNotFound(id) | StoreError::NoHeartbeats(id) => id,
        }
    }
}
