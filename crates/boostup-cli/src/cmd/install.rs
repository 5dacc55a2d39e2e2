//! Install command

use anyhow::Result;
use boostup_core::InstallationResolver;
use boostup_schema::Version;

use crate::GlobalArgs;

/// Resolve `version` (default: latest) into the install cache and print its prefix
pub async fn install(global: &GlobalArgs, version: Option<Version>, b2_args: Vec<String>) -> Result<()> {
    let ctx = global.context()?;
    let resolved = InstallationResolver::new(&ctx)
        .with_b2_args(b2_args)
        .resolve(version)
        .await?;

    if !resolved.cached {
        tracing::info!(
            version = %resolved.installation.version,
            source = %resolved.source.path().display(),
            "provisioned"
        );
    }
    println!("{}", resolved.installation.prefix.display());
    Ok(())
}
