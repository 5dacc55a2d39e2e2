//! Error taxonomy for provisioning.
//!
//! Every failure surfaced by the core library is a [`ProvisionError`]. The
//! variants are grouped the same way callers need to react to them:
//! configuration problems, lookups that found nothing, missing prerequisites
//! on disk, failed external commands and corrupt installations.

use std::path::{Path, PathBuf};

use boostup_schema::{UnsupportedCompiler, Version, VersionParseError};
use thiserror::Error;

use crate::io::extract::ExtractError;

/// Result alias used throughout the core library.
pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;

/// Errors raised while resolving, downloading, building or querying Boost.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The host compiler does not map to a supported toolset.
    #[error(transparent)]
    UnsupportedCompiler(#[from] UnsupportedCompiler),

    /// The release index contained no `Version X.Y.Z` anchors at all.
    #[error("No Boost release links found in {url}")]
    UnparsableIndex {
        /// Location of the release index document.
        url: String,
    },

    /// The release index parsed, but no release qualified.
    #[error("No downloadable Boost releases listed in {url}")]
    NoReleases {
        /// Location of the release index document.
        url: String,
    },

    /// The requested version is not in the release catalog.
    #[error("Boost {0} is not available from the release index")]
    VersionNotFound(Version),

    /// A release page has no link to a source archive.
    #[error("No {} link found in {url}", boostup_schema::ARCHIVE_EXTENSION)]
    ArchiveLinkNotFound {
        /// Location of the release page.
        url: String,
    },

    /// No installed library file matches the requested short name.
    #[error("No C++Boost '{name}' library in {dirs:?}")]
    LibraryNotFound {
        /// Short library name that was looked up (`system`).
        name: String,
        /// Directories that were searched.
        dirs: Vec<PathBuf>,
    },

    /// Positional access past the end of the library directory list.
    #[error("Library directory index {index} out of range for {len} directories")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of directories available.
        len: usize,
    },

    /// A pipeline step ran before its prerequisite produced this path.
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// An external command could not be started.
    #[error("Failed to start `{command}` in {}: {source}", .cwd.display())]
    Spawn {
        /// Full command line.
        command: String,
        /// Working directory.
        cwd: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// An external command exited unsuccessfully.
    #[error("Failed to run `{command}` in {}: {}", .cwd.display(), describe_exit(.code, .log))]
    CommandFailed {
        /// Full command line.
        command: String,
        /// Working directory.
        cwd: PathBuf,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Build log holding the command output, if it was captured.
        log: Option<PathBuf>,
    },

    /// An install prefix exists but lacks expected content.
    #[error(
        "Boost installation in {} is corrupt: {} is missing. Remove {} and try again",
        .prefix.display(),
        .missing.display(),
        .prefix.display()
    )]
    CorruptInstallation {
        /// The install prefix.
        prefix: PathBuf,
        /// The expected path that does not exist.
        missing: PathBuf,
    },

    /// A URL could not be parsed or joined.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL or href.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// A version string could not be parsed.
    #[error(transparent)]
    InvalidVersion(#[from] VersionParseError),

    /// Archive extraction failed.
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking extraction or build task panicked or was cancelled.
    #[error("Task panic: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ProvisionError {
    /// Build a [`ProvisionError::MissingFile`] for `path`.
    pub fn missing(path: impl AsRef<Path>) -> Self {
        Self::MissingFile(path.as_ref().to_path_buf())
    }

    /// Whether this is a lookup failure (the requested key does not exist).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::VersionNotFound(_)
                | Self::ArchiveLinkNotFound { .. }
                | Self::LibraryNotFound { .. }
                | Self::IndexOutOfRange { .. }
        )
    }
}

#[allow(clippy::ref_option)]
fn describe_exit(code: &Option<i32>, log: &Option<PathBuf>) -> String {
    let status = match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    };
    match log {
        Some(log) => format!("{status} (log: {})", log.display()),
        None => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message() {
        let err = ProvisionError::CommandFailed {
            command: "bash bootstrap.sh".to_string(),
            cwd: PathBuf::from("/tmp/boost_1_60_0"),
            code: Some(2),
            log: Some(PathBuf::from("/tmp/build.log")),
        };
        let msg = err.to_string();
        assert!(msg.contains("bash bootstrap.sh"));
        assert!(msg.contains("/tmp/boost_1_60_0"));
        assert!(msg.contains("exit code 2"));
        assert!(msg.contains("/tmp/build.log"));
    }

    #[test]
    fn test_corrupt_installation_instructs_removal() {
        let err = ProvisionError::CorruptInstallation {
            prefix: PathBuf::from("/home/u/.boostup/install/1.60.0/gcc"),
            missing: PathBuf::from("/home/u/.boostup/install/1.60.0/gcc/lib"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Remove /home/u/.boostup/install/1.60.0/gcc"));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(ProvisionError::VersionNotFound(Version::new(1, 60, 0)).is_not_found());
        assert!(ProvisionError::IndexOutOfRange { index: 1, len: 1 }.is_not_found());
        assert!(!ProvisionError::missing("/nope").is_not_found());
    }
}
