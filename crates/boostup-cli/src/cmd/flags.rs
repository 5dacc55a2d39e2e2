//! Build flags command

use anyhow::Result;
use boostup_schema::Version;

use crate::{FlagsFormat, GlobalArgs};

/// Print include/lib directories and toolset flags of an installation
pub fn flags(global: &GlobalArgs, version: Option<&Version>, format: FlagsFormat) -> Result<()> {
    let ctx = global.context()?;
    let flags = super::installed(&ctx, version)?.flags();

    match format {
        FlagsFormat::Json => println!("{}", flags.to_json()?),
        FlagsFormat::Cargo => {
            for line in flags.cargo_directives() {
                println!("{line}");
            }
        }
        FlagsFormat::Shell => {
            for line in flags.shell_exports() {
                println!("{line}");
            }
        }
    }
    Ok(())
}
