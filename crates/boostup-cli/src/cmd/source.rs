//! Source pipeline commands
//!
//! Each subcommand runs exactly one step, so a failed build can be resumed by
//! hand. Steps check their prerequisite on disk and say which file is missing.

use anyhow::Result;
use boostup_core::{Context, SourceHandle};

use crate::{GlobalArgs, SourceArgs, SourceCommands};

async fn handle<'a>(ctx: &'a Context, args: &SourceArgs) -> Result<SourceHandle<'a>> {
    let root = args
        .dir
        .clone()
        .unwrap_or_else(|| ctx.layout.cache_root());
    let source = match &args.version {
        Some(version) => SourceHandle::new(ctx, version.clone(), root)?,
        None => SourceHandle::latest(ctx, root).await?,
    };
    Ok(source)
}

/// Run one source pipeline step
pub async fn source(global: &GlobalArgs, command: SourceCommands) -> Result<()> {
    let ctx = global.context()?;

    match command {
        SourceCommands::Download(args) => {
            let mut source = handle(&ctx, &args).await?;
            let archive = source.download().await?;
            println!("{}", archive.display());
        }
        SourceCommands::Extract(args) => {
            let mut source = handle(&ctx, &args).await?;
            let path = source.extract().await?;
            println!("{}", path.display());
        }
        SourceCommands::Bootstrap(args) => {
            let mut source = handle(&ctx, &args).await?;
            source.bootstrap().await?;
            println!("{}", source.driver().display());
        }
        SourceCommands::Build { source: args, b2 } => {
            let mut source = handle(&ctx, &args).await?;
            source.bootstrap().await?;
            source.b2(&b2.resolve()).await?;
            println!("{}", source.path().display());
        }
        SourceCommands::Install {
            source: args,
            prefix,
            b2,
        } => {
            let mut source = handle(&ctx, &args).await?;
            let prefix = source.install(prefix.as_deref(), &b2.resolve()).await?;
            println!("{}", prefix.display());
        }
    }
    Ok(())
}
