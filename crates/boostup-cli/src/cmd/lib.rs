//! Library name lookup command

use anyhow::Result;
use boostup_schema::Version;

use crate::GlobalArgs;

/// Print the installed link name for short library `name`
pub fn lib(global: &GlobalArgs, name: &str, version: Option<&Version>) -> Result<()> {
    let ctx = global.context()?;
    let installation = super::installed(&ctx, version)?;

    let full_name = installation.libraries().lookup(name)?;
    println!("{full_name}");
    Ok(())
}
