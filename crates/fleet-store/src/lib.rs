//! fleet-store — in-memory metrics store for the device fleet.
//!
//! Accumulates heartbeats and upload-duration samples per device and
//! derives uptime and average upload time on demand.
//!
//! # Architecture
//!
//! ```text
//! MetricsStore
//!   ├── DashMap<device_id, Arc<DeviceState>>   ← directory tier (sharded)
//!   └── DeviceState
//!         └── RwLock<History>                  ← per-device tier
//!               ├── heartbeats (distinct instants)
//!               ├── uploads (every sample)
//!               └── first/last heartbeat bounds
//! ```
//!
//! The directory lock is held only while looking up or inserting a
//! device. Metric computation runs under the device's shared lock, so
//! traffic for one device never waits on another.

pub mod device;
pub mod error;
pub mod store;

pub use device::{DeviceState, DeviceStats};
pub use error::{StoreError, StoreResult};
pub use store::MetricsStore;
