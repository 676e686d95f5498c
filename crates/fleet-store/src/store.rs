//! MetricsStore — concurrent directory of per-device state.
//!
//! The directory is a sharded `DashMap`; a shard lock is held only long
//! enough to find or insert a device and clone out its `Arc`. All event
//! writes and stat reads then go through the device's own lock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::device::{DeviceState, DeviceStats};
use crate::error::{StoreError, StoreResult};

/// Process-wide metrics store. Share it as `Arc<MetricsStore>`.
#[derive(Default)]
pub struct MetricsStore {
    devices: DashMap<String, Arc<DeviceState>>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a device has state. Calling again never resets its history.
    pub fn register_device(&self, device_id: &str) {
        self.device_or_insert(device_id);
    }

    /// Record a heartbeat, creating the device's state on first contact.
    pub fn record_heartbeat(&self, device_id: &str, sent_at: DateTime<Utc>) {
        self.device_or_insert(device_id).add_heartbeat(sent_at);
    }

    /// Record an upload sample, creating the device's state on first contact.
    ///
    /// `sent_at` is accepted for parity with heartbeats; only the duration
    /// feeds the average.
    pub fn record_upload(&self, device_id: &str, _sent_at: DateTime<Utc>, duration: Duration) {
        self.device_or_insert(device_id).add_upload(duration);
    }

    /// Uptime and average upload time for a device.
    pub fn get_stats(&self, device_id: &str) -> StoreResult<DeviceStats> {
        let device = self
            .device(device_id)
            .ok_or_else(|| StoreError::DeviceNotFound(device_id.to_string()))?;
        device
            .stats()
            .ok_or_else(|| StoreError::NoHeartbeats(device_id.to_string()))
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.devices.contains_key(device_id)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// All known device IDs, sorted.
    pub fn device_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.devices.iter().map(|e| e.key().clone()).collect();
        ids.sort_unstable();
        ids
    }

    /// Distinct heartbeat count, or `None` for an unknown device.
    pub fn heartbeat_count(&self, device_id: &str) -> Option<usize> {
        self.device(device_id).map(|d| d.heartbeat_count())
    }

    /// Upload sample count, or `None` for an unknown device.
    pub fn upload_count(&self, device_id: &str) -> Option<usize> {
        self.device(device_id).map(|d| d.upload_count())
    }

    /// Look up a device without creating it. The shard guard is dropped
    /// before returning.
    fn device(&self, device_id: &str) -> Option<Arc<DeviceState>> {
        self.devices.get(device_id).map(|d| Arc::clone(d.value()))
    }

    /// Look up or create a device. Concurrent first contacts race on the
    /// shard entry; exactly one `DeviceState` is inserted and every caller
    /// gets that one.
    fn device_or_insert(&self, device_id: &str) -> Arc<DeviceState> {
        if let Some(device) = self.device(device_id) {
            return device;
        }
        match self.devices.entry(device_id.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                debug!(%device_id, "device state created");
                Arc::clone(entry.insert(Arc::new(DeviceState::new())).value())
            }
        }
    }
}
