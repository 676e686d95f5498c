//! Per-device event history.
//!
//! A `DeviceState` owns one device's heartbeats and upload samples behind
//! its own read/write lock. Writers take the exclusive guard for a single
//! insert; stat reads take the shared guard and compute both metrics from
//! one consistent view.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

const FULL_UPTIME: f64 = 100.0;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Derived metrics for one device at the moment of the read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceStats {
    /// Percentage of expected heartbeats received, in `[0, 100]`.
    pub uptime: f64,
    /// Mean upload duration, truncated to whole nanoseconds. Zero with no uploads.
    pub average_upload: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct History {
    heartbeats: HashSet<DateTime<Utc>>,
    uploads: Vec<Duration>,
    first_heartbeat: Option<DateTime<Utc>>,
    last_heartbeat: Option<DateTime<Utc>>,
}

impl History {
    fn uptime(&self) -> Option<f64> {
        let first = self.first_heartbeat?;
        let last = self.last_heartbeat?;
        Some(uptime_percentage(self.heartbeats.len(), first, last))
    }

    fn average_upload(&self) -> Duration {
        average_duration(&self.uploads)
    }
}

/// One device's accumulated heartbeats and upload samples.
#[derive(Debug, Default)]
pub struct DeviceState {
    history: RwLock<History>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heartbeat. Repeating an instant already seen is a no-op
    /// for the count but still a valid call.
    pub fn add_heartbeat(&self, sent_at: DateTime<Utc>) {
        let mut history = self.history.write();
        history.heartbeats.insert(sent_at);
        history.first_heartbeat = Some(history.first_heartbeat.map_or(sent_at, |t| t.min(sent_at)));
        history.last_heartbeat = Some(history.last_heartbeat.map_or(sent_at, |t| t.max(sent_at)));
    }

    /// Record one upload sample. Every call is kept, including repeats.
    pub fn add_upload(&self, duration: Duration) {
        self.history.write().uploads.push(duration);
    }

    /// Uptime percentage, or `None` before the first heartbeat.
    pub fn compute_uptime(&self) -> Option<f64> {
        self.history.read().uptime()
    }

    /// Mean upload duration; zero when no uploads were recorded.
    pub fn compute_average_upload(&self) -> Duration {
        self.history.read().average_upload()
    }

    /// Both metrics from a single shared-lock view, or `None` before the
    /// first heartbeat.
    pub fn stats(&self) -> Option<DeviceStats> {
        let history = self.history.read();
        let uptime = history.uptime()?;
        Some(DeviceStats {
            uptime,
            average_upload: history.average_upload(),
        })
    }

    /// Number of distinct heartbeat instants.
    pub fn heartbeat_count(&self) -> usize {
        self.history.read().heartbeats.len()
    }

    /// Number of upload samples.
    pub fn upload_count(&self) -> usize {
        self.history.read().uploads.len()
    }

    /// Earliest and latest heartbeat seen so far.
    pub fn heartbeat_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let history = self.history.read();
        history.first_heartbeat.zip(history.last_heartbeat)
    }

    #[cfg(test)]
    pub(crate) fn lock_exclusive(&self) -> parking_lot::RwLockWriteGuard<'_, History> {
        self.history.write()
    }
}

/// Uptime over the whole-minute span between the first and last heartbeat.
///
/// Devices report once per minute, so each elapsed minute is one expected
/// heartbeat. A span shorter than one minute has too little data to
/// estimate and counts as full uptime.
fn uptime_percentage(distinct: usize, first: DateTime<Utc>, last: DateTime<Utc>) -> f64 {
    let elapsed_minutes = (last - first).num_minutes();
    if elapsed_minutes <= 0 {
        return FULL_UPTIME;
    }
    let ratio = distinct as f64 / elapsed_minutes as f64;
    (ratio * FULL_UPTIME).min(FULL_UPTIME)
}

/// Integer mean in nanoseconds, truncating the remainder.
fn average_duration(samples: &[Duration]) -> Duration {
    if samples.is_empty() {
        return Duration::ZERO;
    }
    let total: u128 = samples.iter().map(Duration::as_nanos).sum();
    let mean = total / samples.len() as u128;
    // The mean never exceeds the largest sample, so both parts fit.
    Duration::new((mean / NANOS_PER_SEC) as u64, (mean % NANOS_PER_SEC) as u32)
}
