//! Toolset command

use anyhow::Result;
use crossterm::style::Stylize;

use crate::GlobalArgs;

/// Show the detected host toolchain
pub fn toolset(global: &GlobalArgs) -> Result<()> {
    let host = global.host()?;
    let lw = 16;

    println!("{:<lw$}{}", "toolset", host.toolset.as_str().bold());
    println!("{:<lw$}{}", "compiler", host.compiler);
    println!("{:<lw$}{}", "address-model", host.address_model);
    match &host.runtime_include {
        Some(dir) => println!("{:<lw$}{}", "include", dir.display()),
        None => println!("{:<lw$}{}", "include", "(none)".dark_grey()),
    }
    Ok(())
}
