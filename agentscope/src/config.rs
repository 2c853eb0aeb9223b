//! Runtime configuration
//!
//! Where pinned tables live and how to reach the agent. Values come from the
//! CLI (see [`crate::cli::Args`]); the defaults match a stock agent install.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// bpffs mount point
pub const DEFAULT_MAP_ROOT: &str = "/sys/fs/bpf";

/// Directory under the bpffs root where the agent pins its tables
pub const DEFAULT_MAP_PREFIX: &str = "tetragon";

/// Agent debug endpoint
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:54321";

/// Debug request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Root directory plus agent prefix for pinned tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLocation {
    pub root: PathBuf,
    pub prefix: String,
}

impl MapLocation {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self { root: root.into(), prefix: prefix.into() }
    }

    /// `<root>/<prefix>/<name>`
    #[must_use]
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.root.join(&self.prefix).join(name)
    }

    /// Use `explicit` if given, otherwise the default path for `name`
    #[must_use]
    pub fn resolve(&self, explicit: Option<&Path>, name: &str) -> PathBuf {
        explicit.map_or_else(|| self.table_path(name), Path::to_path_buf)
    }
}

impl Default for MapLocation {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_ROOT, DEFAULT_MAP_PREFIX)
    }
}

/// Debug client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub address: String,
    /// `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// A zero `timeout_secs` disables the timeout
    pub fn new(address: impl Into<String>, timeout_secs: u64) -> Self {
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
        Self { address: address.into(), timeout }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_ADDRESS, DEFAULT_TIMEOUT_SECS)
    }
}
