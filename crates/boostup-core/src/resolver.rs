//! Install cache keyed by (version, toolset).
//!
//! An existing prefix directory is a cache hit and returns without touching
//! the network or spawning anything. A miss drives a [`SourceHandle`] through
//! download, extract, bootstrap and install into a fresh prefix.
//!
//! Two processes resolving the same pair at once can both miss and build into
//! the same prefix; there is no locking.

use std::path::{Path, PathBuf};

use boostup_schema::{Toolset, Version};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::error::{ProvisionError, Result};
use crate::flags::BuildFlags;
use crate::libs::LibraryIndex;
use crate::source::SourceHandle;

/// An installed Boost prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Installation {
    /// Installed release.
    pub version: Version,
    /// Toolset it was built with.
    pub toolset: Toolset,
    /// `<install home>/<version>/<toolset>`.
    pub prefix: PathBuf,
}

impl Installation {
    /// `<prefix>/include`
    pub fn include_dir(&self) -> PathBuf {
        self.prefix.join("include")
    }

    /// `<prefix>/lib`
    pub fn lib_dir(&self) -> PathBuf {
        self.prefix.join("lib")
    }

    /// Header directories: the base include dir, then `include/boost-X_Y` if present.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        let base = self.include_dir();
        let versioned = base.join(format!("boost-{}", self.version.header_suffix()));
        let mut dirs = vec![base];
        if versioned.is_dir() {
            dirs.push(versioned);
        }
        dirs
    }

    /// Library search directories.
    pub fn lib_dirs(&self) -> Vec<PathBuf> {
        vec![self.lib_dir()]
    }

    /// Short-name lookup over [`Installation::lib_dirs`].
    pub fn libraries(&self) -> LibraryIndex {
        LibraryIndex::new(self.lib_dirs())
    }

    /// Settings for a consuming build.
    pub fn flags(&self) -> BuildFlags {
        BuildFlags::new(self.toolset, self.include_dirs(), self.lib_dirs())
    }

    /// Whether the prefix directory exists.
    pub fn exists(&self) -> bool {
        self.prefix.exists()
    }

    /// Check the prefix holds both `include` and `lib`.
    pub fn verify(&self) -> Result<()> {
        for expected in [self.include_dir(), self.lib_dir()] {
            if !expected.is_dir() {
                return Err(ProvisionError::CorruptInstallation {
                    prefix: self.prefix.clone(),
                    missing: expected,
                });
            }
        }
        Ok(())
    }
}

/// A resolved installation and the source release behind it.
#[derive(Debug)]
pub struct Resolved<'a> {
    /// The verified installation.
    pub installation: Installation,
    /// Source handle under the cache root.
    pub source: SourceHandle<'a>,
    /// Whether the prefix already existed.
    pub cached: bool,
}

/// Maps a requested version to a verified install prefix, building on a miss.
#[derive(Debug)]
pub struct InstallationResolver<'a> {
    ctx: &'a Context,
    b2_args: Vec<String>,
}

impl<'a> InstallationResolver<'a> {
    /// Resolver with no extra driver arguments.
    pub fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            b2_args: Vec::new(),
        }
    }

    /// Extra `b2` arguments for installs this resolver performs.
    pub fn with_b2_args(mut self, args: Vec<String>) -> Self {
        self.b2_args = args;
        self
    }

    /// The installation `version` maps to for the host toolset, without IO.
    pub fn locate(&self, version: &Version) -> Installation {
        let toolset = self.ctx.host.toolset;
        Installation {
            version: version.clone(),
            toolset,
            prefix: self.ctx.layout.install_prefix(version, toolset),
        }
    }

    /// Installations present for the host toolset, oldest first.
    ///
    /// Directories under the install home that do not parse as a version are
    /// ignored. Nothing is verified.
    pub fn installed(&self) -> Result<Vec<Installation>> {
        let install_home = self.ctx.layout.install_home();
        if !install_home.is_dir() {
            return Ok(Vec::new());
        }

        let mut versions: Vec<Version> = std::fs::read_dir(&install_home)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        versions.sort();

        Ok(versions
            .iter()
            .map(|v| self.locate(v))
            .filter(Installation::exists)
            .collect())
    }

    /// Newest installation for the host toolset, if any.
    pub fn newest_installed(&self) -> Result<Option<Installation>> {
        Ok(self.installed()?.pop())
    }

    /// Resolve `version`, or the newest release when `None`.
    pub async fn resolve(&self, version: Option<Version>) -> Result<Resolved<'a>> {
        let version = match version {
            Some(version) => version,
            None => self.ctx.catalog.latest_version().await?,
        };
        let installation = self.locate(&version);
        let mut source = SourceHandle::new(self.ctx, version, self.ctx.layout.cache_root())?;

        if installation.exists() {
            debug!(prefix = %installation.prefix.display(), "install cache hit");
            installation.verify()?;
            self.ctx
                .reporter
                .cached(&installation.version, &installation.prefix);
            return Ok(Resolved {
                installation,
                source,
                cached: true,
            });
        }

        self.ctx
            .reporter
            .section(&format!("Installing Boost {}", installation.version));
        if let Err(e) = self.provision(&mut source, &installation.prefix).await {
            discard_prefix(&installation.prefix);
            return Err(e);
        }
        installation.verify()?;

        info!(prefix = %installation.prefix.display(), "installed");
        Ok(Resolved {
            installation,
            source,
            cached: false,
        })
    }

    async fn provision(&self, source: &mut SourceHandle<'a>, prefix: &Path) -> Result<()> {
        if source.remove_source_tree()? {
            self.ctx.reporter.info(&format!(
                "Removed stale source tree {}",
                source.path().display()
            ));
        }

        if source.archive().is_file() {
            info!(archive = %source.archive().display(), "using cached archive");
        } else {
            source.download().await?;
        }
        source.extract().await?;
        source.bootstrap().await?;

        std::fs::create_dir_all(prefix)?;
        source.install(Some(prefix), &self.b2_args).await?;
        Ok(())
    }
}

/// Remove a prefix left behind by a failed provisioning run so the next
/// resolve retries instead of reporting a corrupt installation.
fn discard_prefix(prefix: &Path) {
    if prefix.exists() {
        if let Err(e) = std::fs::remove_dir_all(prefix) {
            warn!(prefix = %prefix.display(), "failed to remove incomplete install: {e}");
        }
    }
}
