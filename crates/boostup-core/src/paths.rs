//! On-disk layout under the boostup home directory.
//!
//! ```text
//! ~/.boostup/
//!   cache/                     downloaded archives and extracted sources
//!   install/<version>/<toolset>/   one prefix per (version, toolset)
//!   logs/                      captured output of bootstrap and b2 runs
//! ```

use std::path::{Path, PathBuf};

use boostup_schema::{Toolset, Version};
use dirs::home_dir;

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "BOOSTUP_HOME";

/// Returns the boostup home directory, or None if the user's home cannot be resolved.
pub fn try_boostup_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var(HOME_ENV) {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".boostup"))
}

/// Resolved directory layout rooted at a home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    home: PathBuf,
}

impl Layout {
    /// Layout rooted at `home`.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// The home directory itself.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Source cache root: ~/.boostup/cache
    pub fn cache_root(&self) -> PathBuf {
        self.home.join("cache")
    }

    /// Install home: ~/.boostup/install
    pub fn install_home(&self) -> PathBuf {
        self.home.join("install")
    }

    /// Logs directory: ~/.boostup/logs
    pub fn log_dir(&self) -> PathBuf {
        self.home.join("logs")
    }

    /// Install prefix for one (version, toolset) pair.
    pub fn install_prefix(&self, version: &Version, toolset: Toolset) -> PathBuf {
        self.install_home()
            .join(version.to_string())
            .join(toolset.as_str())
    }

    /// Generate a build log path for one pipeline step.
    pub fn build_log_path(&self, version: &Version, step: &str) -> PathBuf {
        let timestamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
        self.log_dir()
            .join(format!("build-boost-{version}-{step}-{timestamp}.log"))
    }
}
