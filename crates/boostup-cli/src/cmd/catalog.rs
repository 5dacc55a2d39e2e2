//! Release listing commands

use anyhow::{Context, Result};

use crate::GlobalArgs;

/// Print every available release, oldest first
pub async fn versions(global: &GlobalArgs) -> Result<()> {
    let catalog = global.catalog()?;
    let versions = catalog
        .versions()
        .await
        .with_context(|| format!("Failed to read release index {}", catalog.index_url()))?;

    for version in versions {
        println!("{version}");
    }
    Ok(())
}

/// Print the newest release
pub async fn latest(global: &GlobalArgs) -> Result<()> {
    let catalog = global.catalog()?;
    let latest = catalog
        .latest_version()
        .await
        .with_context(|| format!("Failed to read release index {}", catalog.index_url()))?;

    println!("{latest}");
    Ok(())
}
