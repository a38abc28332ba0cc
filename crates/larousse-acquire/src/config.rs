use std::path::PathBuf;
use std::time::Duration;

/// Site every relative reference is resolved against.
pub const SITE_ORIGIN: &str = "https://www.larousse.fr";

/// Default output root, one folder per entry below it.
pub const DEFAULT_ROOT_DIR: &str = "Learning/French/Larousse";

/// Ceiling for the page load plus network-idle wait.
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 60;

/// Per-asset download timeout.
pub const DEFAULT_ASSET_TIMEOUT_SECS: u64 = 20;

/// Longest filename kept from an asset URL before a name is synthesized.
pub const MAX_FILENAME_LEN: usize = 100;

/// Settings for one snapshot run.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Directory under which `<safe_name>/` bundles are written.
    pub root_dir: PathBuf,
    /// Scheme and host used to build entry URLs and resolve relative assets.
    pub origin: String,
    pub render_timeout: Duration,
    pub asset_timeout: Duration,
    pub max_filename_len: usize,
    /// Chrome/Chromium executable (None for auto-detection).
    pub chrome_path: Option<PathBuf>,
    pub user_agent: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            origin: SITE_ORIGIN.to_string(),
            render_timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
            asset_timeout: Duration::from_secs(DEFAULT_ASSET_TIMEOUT_SECS),
            max_filename_len: MAX_FILENAME_LEN,
            chrome_path: None,
            user_agent: concat!("larousse/", env!("CARGO_PKG_VERSION"), " (offline dictionary snapshot)")
                .to_string(),
        }
    }
}

impl SnapshotConfig {
    pub fn with_root(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into().trim_end_matches('/').to_string();
        self
    }
}
