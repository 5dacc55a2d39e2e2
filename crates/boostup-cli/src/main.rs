//! boostup - fetch, build and cache C++ Boost releases

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use boostup_cli::cmd;
use boostup_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries command results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = &cli.global;

    match cli.command {
        Commands::Versions => cmd::catalog::versions(global).await,
        Commands::Latest => cmd::catalog::latest(global).await,
        Commands::Toolset => cmd::toolset::toolset(global),
        Commands::Install { version, b2 } => {
            cmd::install::install(global, version, b2.resolve()).await
        }
        Commands::Source { command } => cmd::source::source(global, command).await,
        Commands::Lib { name, version } => cmd::lib::lib(global, &name, version.as_ref()),
        Commands::Flags { version, format } => cmd::flags::flags(global, version.as_ref(), format),
        Commands::Clean { archives } => cmd::clean::clean(global, archives),
    }
}
