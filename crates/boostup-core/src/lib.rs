//! Core library for boostup.
//!
//! [`ReleaseCatalog`] reads the Boost release history page. [`SourceHandle`]
//! takes one release from archive to installed prefix, and
//! [`InstallationResolver`] caches those prefixes per version and toolset.
//! [`LibraryIndex`] and [`BuildFlags`] describe an installation to a
//! consuming build. Network access is async; extraction and build commands
//! run on tokio's blocking pool.

pub mod catalog;
pub mod context;
pub mod error;
pub mod flags;
pub mod host;
pub mod io;
pub mod libs;
pub mod paths;
pub mod resolver;
pub mod source;

pub mod reporter;

#[cfg(test)]
mod test_support;

pub use catalog::{CatalogSnapshot, ReleaseCatalog};
pub use context::Context;
pub use error::{ProvisionError, Result};
pub use flags::BuildFlags;
pub use host::Host;
pub use libs::LibraryIndex;
pub use paths::*;
pub use reporter::Reporter;
pub use resolver::{Installation, InstallationResolver, Resolved};
pub use source::{SourceHandle, SourceState};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("boostup/", env!("CARGO_PKG_VERSION"));
