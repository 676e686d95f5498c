//! Append-only results file.
//!
//! Every successful stats read is appended as one human-readable line.
//! The log only observes computed stats; failures here never reach the
//! client.

use std::io;
use std::path::{Path, PathBuf};

use fleet_store::DeviceStats;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::format::format_duration;

pub struct ResultsLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl ResultsLog {
    /// Open (or create) the results file for appending.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one stats line, logging instead of returning on failure.
    pub async fn record(&self, device_id: &str, stats: &DeviceStats) {
        let line = format_line(device_id, stats);
        if let Err(e) = self.append(&line).await {
            warn!(path = ?self.path, error = %e, "failed to append stats line");
        }
    }

    async fn append(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

/// `[<device>] uptime <pct>% | avgUploadTime <duration>` plus newline.
pub fn format_line(device_id: &str, stats: &DeviceStats) -> String {
    format!(
        "[{device_id}] uptime {:.6}% | avgUploadTime {}\n",
        stats.uptime,
        format_duration(stats.average_upload)
    )
}
