//! Device whitelist — the set of device IDs allowed to report.
//!
//! The file is a one-column CSV: one device ID per line, optionally led by
//! a `device_id` header. Extra columns are ignored, quoted cells follow
//! the usual CSV rules, and a leading byte-order mark is dropped. Blank
//! lines and `#` comments are skipped.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

const HEADER: &str = "device_id";

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceWhitelist {
    ids: BTreeSet<String>,
}

impl DeviceWhitelist {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let whitelist = Self::parse(&content)?;
        debug!(?path, devices = whitelist.len(), "device whitelist loaded");
        Ok(whitelist)
    }

    pub fn parse(content: &str) -> ConfigResult<Self> {
        let content = content.strip_prefix(BOM).unwrap_or(content);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut ids = BTreeSet::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let Some(id) = record.get(0) else { continue };
            if id.is_empty() || (row == 0 && id.eq_ignore_ascii_case(HEADER)) {
                continue;
            }
            ids.insert(id.to_string());
        }
        Ok(Self { ids })
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.ids.contains(device_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Device IDs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DeviceWhitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
