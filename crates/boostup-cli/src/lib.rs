//! boostup - fetch, build and cache C++ Boost releases
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Resolves a Boost release from the boost.org version history, builds it
//! with the host compiler toolset and caches the install per
//! (version, toolset). The install's include and lib directories can then be
//! queried for use by other build systems.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.boostup/
//! ├── cache/      # boost_X_Y_Z.tar.bz2 archives and extracted sources
//! ├── install/    # <version>/<toolset>/{include,lib}
//! └── logs/       # bootstrap and b2 output
//! ```

pub mod cmd;
pub mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use boostup_core::catalog::{DEFAULT_INDEX_URL, parse_url};
use boostup_core::io::fetch::HttpFetcher;
use boostup_core::io::process::SystemRunner;
use boostup_core::{Context, Host, Layout, ReleaseCatalog, try_boostup_home};
use boostup_schema::Version;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::ui::ConsoleReporter;

#[derive(Debug, Parser)]
#[command(name = "boostup")]
#[command(author, version = env!("BOOSTUP_VERSION"), about = "boostup - fetch, build and cache C++ Boost releases")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Directory holding the archive cache, installs and build logs [default: ~/.boostup]
    #[arg(long, global = true, env = "BOOSTUP_HOME")]
    pub home: Option<PathBuf>,

    /// Boost version history page
    #[arg(long, global = true, env = "BOOSTUP_INDEX_URL", default_value = DEFAULT_INDEX_URL)]
    pub index_url: String,

    /// Compiler identity used to pick the toolset, e.g. "GCC 9.3.0" [default: probe cc]
    #[arg(long, global = true, env = "BOOSTUP_COMPILER")]
    pub compiler: Option<String>,

    /// Runtime include directory passed to b2 as include= [default: probe python]
    #[arg(long, global = true, env = "BOOSTUP_RUNTIME_INCLUDE")]
    pub runtime_include: Option<PathBuf>,

    /// Stream bootstrap and b2 output instead of writing build logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List available Boost releases, oldest first
    Versions,
    /// Print the newest available Boost release
    Latest,
    /// Show the detected compiler toolset
    Toolset,
    /// Install a Boost release into the cache (default: latest)
    Install {
        /// Release version, e.g. 1.60.0
        version: Option<Version>,
        #[command(flatten)]
        b2: B2Args,
    },
    /// Run individual source pipeline steps
    Source {
        #[command(subcommand)]
        command: SourceCommands,
    },
    /// Resolve a short library name to its installed link name
    Lib {
        /// Short name, e.g. system
        name: String,
        /// Installed version to query [default: newest installed]
        #[arg(long)]
        version: Option<Version>,
    },
    /// Print include/lib directories and compiler flags of an installation
    Flags {
        /// Installed version to query [default: newest installed]
        #[arg(long)]
        version: Option<Version>,
        /// Output format
        #[arg(long, value_enum, default_value_t = FlagsFormat::Json)]
        format: FlagsFormat,
    },
    /// Remove extracted source trees from the cache
    Clean {
        /// Also remove downloaded archives
        #[arg(long)]
        archives: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum SourceCommands {
    /// Download the source archive
    Download(SourceArgs),
    /// Extract a downloaded archive
    Extract(SourceArgs),
    /// Build the b2 driver
    Bootstrap(SourceArgs),
    /// Bootstrap and build in-tree
    Build {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        b2: B2Args,
    },
    /// Install headers and libraries into a prefix
    Install {
        #[command(flatten)]
        source: SourceArgs,
        /// Install prefix [default: current directory]
        #[arg(long)]
        prefix: Option<PathBuf>,
        #[command(flatten)]
        b2: B2Args,
    },
}

/// Selects one source release.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Release version [default: latest]
    pub version: Option<Version>,
    /// Directory for the archive and source tree [default: <home>/cache]
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Whitespace-separated b2 arguments used when no `--b2-arg` is given.
pub const B2_ARGS_ENV: &str = "BOOSTUP_B2_ARGS";

/// Extra arguments forwarded verbatim to b2.
#[derive(Debug, Clone, Default, Args)]
pub struct B2Args {
    /// Extra b2 argument (repeatable), e.g. --b2-arg=--with-system
    #[arg(long = "b2-arg", allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl B2Args {
    /// Command-line values, else the words of `BOOSTUP_B2_ARGS`.
    pub fn resolve(&self) -> Vec<String> {
        self.or_env(std::env::var(B2_ARGS_ENV).ok().as_deref())
    }

    fn or_env(&self, env: Option<&str>) -> Vec<String> {
        if !self.args.is_empty() {
            return self.args.clone();
        }
        env.map(|value| value.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FlagsFormat {
    /// JSON object
    #[default]
    Json,
    /// cargo: build script directives
    Cargo,
    /// POSIX shell exports
    Shell,
}

impl GlobalArgs {
    /// The boostup home directory.
    pub fn home(&self) -> Result<PathBuf> {
        self.home
            .clone()
            .or_else(try_boostup_home)
            .context("Could not determine home directory. Set BOOSTUP_HOME to override.")
    }

    /// Directory layout under [`GlobalArgs::home`].
    pub fn layout(&self) -> Result<Layout> {
        Ok(Layout::new(self.home()?))
    }

    /// Release catalog over the configured index.
    pub fn catalog(&self) -> Result<ReleaseCatalog> {
        let index_url = parse_url(&self.index_url)?;
        let fetch = HttpFetcher::new().context("Failed to create HTTP client")?;
        Ok(ReleaseCatalog::new(Arc::new(fetch), index_url))
    }

    /// Detect the host toolchain, honouring overrides.
    pub fn host(&self) -> Result<Host> {
        Ok(Host::detect(
            self.compiler.as_deref(),
            self.runtime_include.as_deref(),
        )?)
    }

    /// Full provisioning context with the terminal reporter.
    pub fn context(&self) -> Result<Context> {
        Ok(Context::new(
            self.host()?,
            self.layout()?,
            self.catalog()?,
            Arc::new(SystemRunner::new(self.verbose)),
            Arc::new(ConsoleReporter::new()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install_with_b2_args() {
        let cli = Cli::try_parse_from([
            "boostup",
            "install",
            "1.60.0",
            "--b2-arg=--with-system",
            "--b2-arg",
            "-j4",
        ])
        .unwrap();
        match cli.command {
            Commands::Install { version, b2 } => {
                assert_eq!(version, Some(Version::new(1, 60, 0)));
                assert_eq!(b2.args, vec!["--with-system", "-j4"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_b2_arg_with_space_stays_whole() {
        let cli = Cli::try_parse_from([
            "boostup",
            "install",
            "1.60.0",
            "--b2-arg",
            "cxxflags=-O2 -g",
        ])
        .unwrap();
        let Commands::Install { b2, .. } = cli.command else {
            panic!("expected install");
        };
        assert_eq!(b2.args, vec!["cxxflags=-O2 -g"]);
        assert_eq!(b2.or_env(Some("--with-system -j8")), vec!["cxxflags=-O2 -g"]);
    }

    #[test]
    fn test_b2_args_fall_back_to_env_words() {
        let b2 = B2Args::default();
        assert_eq!(
            b2.or_env(Some(" --with-system   -j8 ")),
            vec!["--with-system", "-j8"]
        );
        assert!(b2.or_env(None).is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_version() {
        assert!(Cli::try_parse_from(["boostup", "install", "one.two"]).is_err());
    }

    #[test]
    fn test_parse_flags_format() {
        let cli = Cli::try_parse_from(["boostup", "flags", "--format", "cargo"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Flags {
                version: None,
                format: FlagsFormat::Cargo
            }
        ));
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "boostup",
            "toolset",
            "--compiler",
            "MSC v.1920",
            "--home",
            "/tmp/boostup",
        ])
        .unwrap();
        assert_eq!(cli.global.compiler.as_deref(), Some("MSC v.1920"));
        assert_eq!(cli.global.home, Some(PathBuf::from("/tmp/boostup")));
    }
}
