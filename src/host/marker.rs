//! Marker files for configured destinations
//!
//! One file per destination IP under `/metastone`, content = gateway address.
//! Presence alone is trusted; there is no expiry and no integrity check, and
//! the stat-then-write sequence is not atomic. Good enough for a single
//! reconciliation loop per node, nothing stronger.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default marker directory on the host.
pub const DEFAULT_MARKER_DIR: &str = "/metastone";

/// Records which destinations have already been configured.
#[derive(Clone, Debug)]
pub struct MarkerStore {
    root: PathBuf,
}

impl Default for MarkerStore {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_DIR)
    }
}

impl MarkerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn marker_path(&self, destination: &str) -> PathBuf {
        self.root.join(destination)
    }

    /// Whether a marker exists for `destination`.
    pub fn is_configured(&self, destination: &str) -> bool {
        self.marker_path(destination).exists()
    }

    /// Write the marker for `destination`, recording the gateway it was
    /// routed through.
    pub fn record(&self, destination: &str, gateway: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.marker_path(destination), gateway)
    }

    /// The gateway recorded for `destination`, if a marker exists.
    pub fn recorded_gateway(&self, destination: &str) -> Option<String> {
        fs::read_to_string(self.marker_path(destination)).ok()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
