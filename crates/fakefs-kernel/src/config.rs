//! Service configuration.
//!
//! Defaults reproduce the stock setup; a RON file can override any field:
//!
//! ```ron
//! (
//!     srv_name: "fakefs",
//!     mountpoint: "/n",
//!     webfs_root: "/mnt/web",
//!     sat_ttl_secs: 20,
//! )
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audit::default_log_path;
use crate::fetch::DEFAULT_WEBFS_ROOT;
use crate::files::satellite::{self, CachePolicy};
use crate::files::rot13;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("no home directory for the audit log; set log_path")]
    NoHome,
}

/// Everything needed to build and serve a [`FakeFs`](crate::FakeFs).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FakefsConfig {
    /// Name the service is posted under.
    pub srv_name: String,
    /// Where the tree is mounted.
    pub mountpoint: PathBuf,
    /// Directory under the mount point holding the files.
    pub dir_name: String,
    /// Audit log location; `$HOME/fakelog` when unset.
    pub log_path: Option<PathBuf>,
    /// Where webfs is mounted.
    pub webfs_root: PathBuf,
    /// Image served as `sat.jpg`.
    pub sat_url: String,
    /// Freshness window for `sat.jpg`.
    pub sat_ttl_secs: u64,
    /// Upper bound on one fetch.
    pub fetch_timeout_secs: u64,
    /// Bytes held by the `rot13` buffer, terminator included.
    pub rot13_capacity: usize,
    /// Largest `sat.jpg` payload kept.
    pub sat_capacity: usize,
}

impl Default for FakefsConfig {
    fn default() -> Self {
        Self {
            srv_name: "fakefs".to_string(),
            mountpoint: PathBuf::from("/n"),
            dir_name: "fake".to_string(),
            log_path: None,
            webfs_root: PathBuf::from(DEFAULT_WEBFS_ROOT),
            sat_url: satellite::DEFAULT_URL.to_string(),
            sat_ttl_secs: satellite::DEFAULT_TTL.as_secs(),
            fetch_timeout_secs: satellite::DEFAULT_FETCH_TIMEOUT.as_secs(),
            rot13_capacity: rot13::DEFAULT_CAPACITY,
            sat_capacity: satellite::DEFAULT_CAPACITY,
        }
    }
}

impl FakefsConfig {
    /// Parse a RON document.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Load a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// The audit log path, falling back to the home directory.
    pub fn resolved_log_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.log_path {
            Some(path) => Ok(path.clone()),
            None => default_log_path().ok_or(ConfigError::NoHome),
        }
    }

    /// Cache settings for `sat.jpg`.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            url: self.sat_url.clone(),
            ttl: Duration::from_secs(self.sat_ttl_secs),
            capacity: self.sat_capacity,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}
