//! One Boost source release on disk and the steps that turn it into an install.
//!
//! ```text
//! Fresh ─download→ Downloaded ─extract→ Extracted ─bootstrap→ Bootstrapped
//!                                                      │
//!                                  b2 → Built, install → Installed
//! ```
//!
//! The state is seeded from whatever the filesystem already holds, so a
//! handle over a half-finished cache directory picks up where the last run
//! stopped. Each step checks the artifact of its prerequisite and fails with
//! [`ProvisionError::MissingFile`] naming that path when it is absent.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use boostup_schema::{ARCHIVE_EXTENSION, LIB_NAME, Version};
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, info};

use crate::context::Context;
use crate::error::{ProvisionError, Result};
use crate::io::extract::extract_tar_bz2;
use crate::io::process::{Invocation, read_last_lines};

/// Lines of a failed command's log shown to the user.
const FAILURE_TAIL_LINES: usize = 20;

/// Progress of a [`SourceHandle`] through the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    /// Nothing on disk.
    Fresh,
    /// Archive present.
    Downloaded,
    /// Source tree present.
    Extracted,
    /// Build driver present.
    Bootstrapped,
    /// Libraries built in-tree.
    Built,
    /// Installed into a prefix.
    Installed,
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fresh => "fresh",
            Self::Downloaded => "downloaded",
            Self::Extracted => "extracted",
            Self::Bootstrapped => "bootstrapped",
            Self::Built => "built",
            Self::Installed => "installed",
        };
        f.write_str(s)
    }
}

/// Name of the extracted source directory (`boost_1_60_0`).
pub fn source_dir_name(version: &Version) -> String {
    format!("{LIB_NAME}_{}", version.lib_version())
}

/// A Boost source release rooted in a download directory.
pub struct SourceHandle<'a> {
    ctx: &'a Context,
    version: Version,
    root: PathBuf,
    path: PathBuf,
    archive: PathBuf,
    state: SourceState,
}

impl fmt::Debug for SourceHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHandle")
            .field("version", &self.version)
            .field("path", &self.path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a> SourceHandle<'a> {
    /// Handle for `version` under `root`, which is made absolute.
    pub fn new(ctx: &'a Context, version: Version, root: impl AsRef<Path>) -> Result<Self> {
        let root = std::path::absolute(root.as_ref())?;
        let path = root.join(source_dir_name(&version));
        let archive = PathBuf::from(format!("{}{ARCHIVE_EXTENSION}", path.display()));

        let mut handle = Self {
            ctx,
            version,
            root,
            path,
            archive,
            state: SourceState::Fresh,
        };
        handle.state = handle.detect_state();
        debug!(version = %handle.version, state = %handle.state, "source handle");
        Ok(handle)
    }

    /// Handle for the newest release in the catalog.
    pub async fn latest(ctx: &'a Context, root: impl AsRef<Path>) -> Result<Self> {
        let version = ctx.catalog.latest_version().await?;
        Self::new(ctx, version, root)
    }

    /// The release version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Directory holding the archive and the source tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extracted source tree: `<root>/boost_X_Y_Z`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Downloaded archive: `<root>/boost_X_Y_Z.tar.bz2`.
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// Build driver produced by [`SourceHandle::bootstrap`].
    pub fn driver(&self) -> PathBuf {
        self.ctx.host.driver_path(&self.path)
    }

    /// Current pipeline state.
    pub fn state(&self) -> SourceState {
        self.state
    }

    fn detect_state(&self) -> SourceState {
        if self.driver().is_file() {
            SourceState::Bootstrapped
        } else if self.path.is_dir() {
            SourceState::Extracted
        } else if self.archive.is_file() {
            SourceState::Downloaded
        } else {
            SourceState::Fresh
        }
    }

    /// Path whose presence proves `stage` was reached.
    fn artifact(&self, stage: SourceState) -> PathBuf {
        match stage {
            SourceState::Fresh => self.root.clone(),
            SourceState::Downloaded => self.archive.clone(),
            SourceState::Extracted => self.path.clone(),
            SourceState::Bootstrapped | SourceState::Built | SourceState::Installed => {
                self.driver()
            }
        }
    }

    fn require(&mut self, stage: SourceState) -> Result<()> {
        let artifact = self.artifact(stage);
        if !artifact.exists() {
            return Err(ProvisionError::MissingFile(artifact));
        }
        if self.state < stage {
            debug!(version = %self.version, %stage, "prerequisite found on disk");
            self.state = stage;
        }
        Ok(())
    }

    fn advance(&mut self, stage: SourceState) {
        self.state = self.state.max(stage);
    }

    fn log_path(&self, step: &str) -> PathBuf {
        self.ctx.layout.build_log_path(&self.version, step)
    }

    async fn run(&self, invocation: &Invocation) -> Result<()> {
        info!(command = %invocation, cwd = %invocation.cwd.display(), "running");
        self.ctx.reporter.running(invocation);

        let runner = Arc::clone(&self.ctx.runner);
        let job = invocation.clone();
        let code = tokio::task::spawn_blocking(move || runner.run(&job))
            .await?
            .map_err(|source| ProvisionError::Spawn {
                command: invocation.to_string(),
                cwd: invocation.cwd.clone(),
                source,
            })?;
        if code == Some(0) {
            return Ok(());
        }

        let log = invocation.log.clone().filter(|log| log.is_file());
        if let Some(log) = &log {
            if let Ok(tail) = read_last_lines(log, FAILURE_TAIL_LINES) {
                self.ctx.reporter.error(&format!(
                    "Last {FAILURE_TAIL_LINES} lines of {}:\n{tail}",
                    log.display()
                ));
            }
        }
        Err(ProvisionError::CommandFailed {
            command: invocation.to_string(),
            cwd: invocation.cwd.clone(),
            code,
            log,
        })
    }

    /// Archive URL, found through the release page of this version.
    pub async fn download_url(&self) -> Result<Url> {
        let release_page = self.ctx.catalog.release_url(&self.version).await?;
        self.ctx.catalog.archive_url(&release_page).await
    }

    /// Download the source archive into [`SourceHandle::root`].
    pub async fn download(&mut self) -> Result<PathBuf> {
        let url = self.download_url().await?;
        let reporter = &self.ctx.reporter;
        let version = &self.version;

        info!(%url, dest = %self.root.display(), "downloading");
        reporter.info(&format!("Downloading {url} to {}", self.root.display()));

        let progress = |current: u64, total: Option<u64>| {
            reporter.downloading(version, current, total);
        };
        let bytes = self
            .ctx
            .catalog
            .fetcher()
            .download(&url, &self.archive, &progress)
            .await?;
        reporter.done(version, &format!("downloaded {bytes} bytes"));

        self.advance(SourceState::Downloaded);
        Ok(self.archive.clone())
    }

    /// Unpack the archive next to it.
    pub async fn extract(&mut self) -> Result<PathBuf> {
        self.require(SourceState::Downloaded)?;
        info!(archive = %self.archive.display(), "extracting");
        self.ctx.reporter.extracting(&self.version, &self.archive);

        let (archive, root) = (self.archive.clone(), self.root.clone());
        let count = tokio::task::spawn_blocking(move || extract_tar_bz2(&archive, &root)).await??;
        if !self.path.is_dir() {
            return Err(ProvisionError::missing(&self.path));
        }
        debug!(count, path = %self.path.display(), "extracted");

        self.advance(SourceState::Extracted);
        Ok(self.path.clone())
    }

    /// Build the `b2` driver with the platform bootstrap script.
    pub async fn bootstrap(&mut self) -> Result<()> {
        self.require(SourceState::Extracted)?;
        let invocation = self
            .ctx
            .host
            .bootstrap_invocation(&self.path)
            .with_log(self.log_path("bootstrap"));
        self.run(&invocation).await?;

        let driver = self.driver();
        if !driver.is_file() {
            return Err(ProvisionError::MissingFile(driver));
        }
        self.advance(SourceState::Bootstrapped);
        Ok(())
    }

    /// Run `b2` with the host flags followed by `args`.
    pub async fn b2(&mut self, args: &[String]) -> Result<()> {
        self.run_driver("b2", args).await?;
        self.advance(SourceState::Built);
        Ok(())
    }

    async fn run_driver(&mut self, step: &str, args: &[String]) -> Result<()> {
        self.require(SourceState::Bootstrapped)?;
        if self.ctx.host.runtime_include.is_none() {
            self.ctx.reporter.warning(
                "No Python include directory found; building without include=. \
                 Set BOOSTUP_RUNTIME_INCLUDE to override.",
            );
        }
        let invocation = Invocation::new(self.driver(), &self.path)
            .args(self.ctx.host.driver_flags())
            .args(args)
            .with_log(self.log_path(step));
        self.run(&invocation).await
    }

    /// Bootstrap, then build in-tree.
    pub async fn build(&mut self) -> Result<()> {
        self.bootstrap().await?;
        self.b2(&[]).await
    }

    /// Install headers and libraries into `prefix` (default: the current directory).
    ///
    /// `args` go to `b2` ahead of `install --prefix=...`. Returns the absolute prefix.
    pub async fn install(&mut self, prefix: Option<&Path>, args: &[String]) -> Result<PathBuf> {
        let prefix = match prefix {
            Some(prefix) => std::path::absolute(prefix)?,
            None => std::env::current_dir()?,
        };

        let mut install_args = args.to_vec();
        install_args.push("install".to_string());
        install_args.push(format!("--prefix={}", prefix.display()));
        self.run_driver("install", &install_args).await?;

        self.advance(SourceState::Installed);
        self.ctx
            .reporter
            .done(&self.version, &format!("installed to {}", prefix.display()));
        Ok(prefix)
    }

    /// Delete the extracted source tree, keeping the archive.
    pub fn remove_source_tree(&mut self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        info!(path = %self.path.display(), "removing source tree");
        std::fs::remove_dir_all(&self.path)?;
        self.state = self.detect_state();
        Ok(true)
    }
}
