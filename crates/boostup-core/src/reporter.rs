//! Reporter trait for dependency injection
//!
//! This trait allows the provisioning pipeline to report progress and status
//! without being coupled to a specific terminal implementation.

use std::path::Path;

use boostup_schema::Version;

use crate::io::process::Invocation;

/// Progress and status sink for provisioning operations.
pub trait Reporter: Send + Sync {
    /// Indicates a new section or phase has started (e.g. "Resolving", "Building").
    fn section(&self, title: &str);

    /// Updates the progress of an archive download.
    fn downloading(&self, version: &Version, current: u64, total: Option<u64>);

    /// An archive is being unpacked.
    fn extracting(&self, version: &Version, archive: &Path);

    /// An external command is about to run.
    fn running(&self, invocation: &Invocation);

    /// A pipeline step finished.
    fn done(&self, version: &Version, detail: &str);

    /// An existing installation was reused.
    fn cached(&self, version: &Version, prefix: &Path);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn downloading(&self, version: &Version, current: u64, total: Option<u64>) {
        (**self).downloading(version, current, total);
    }
    fn extracting(&self, version: &Version, archive: &Path) {
        (**self).extracting(version, archive);
    }
    fn running(&self, invocation: &Invocation) {
        (**self).running(invocation);
    }
    fn done(&self, version: &Version, detail: &str) {
        (**self).done(version, detail);
    }
    fn cached(&self, version: &Version, prefix: &Path) {
        (**self).cached(version, prefix);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}
