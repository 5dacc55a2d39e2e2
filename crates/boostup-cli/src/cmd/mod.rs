//! Command implementations, one module per subcommand family.

pub mod catalog;
pub mod clean;
pub mod flags;
pub mod install;
pub mod lib;
pub mod source;
pub mod toolset;

use anyhow::{Context as _, Result, bail};
use boostup_core::{Context, Installation, InstallationResolver};
use boostup_schema::Version;

/// The verified installation of `version`, or the newest one for the host toolset.
pub(crate) fn installed(ctx: &Context, version: Option<&Version>) -> Result<Installation> {
    let resolver = InstallationResolver::new(ctx);
    let toolset = ctx.host.toolset;

    let installation = match version {
        Some(version) => resolver.locate(version),
        None => resolver.newest_installed()?.with_context(|| {
            format!("No Boost installation for toolset {toolset}. Run `boostup install` first.")
        })?,
    };
    if !installation.exists() {
        bail!(
            "Boost {} is not installed for toolset {toolset}. Run `boostup install {}` first.",
            installation.version,
            installation.version
        );
    }
    installation.verify()?;
    Ok(installation)
}
