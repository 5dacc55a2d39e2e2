//! Shared value types for boostup.
//!
//! Everything in this crate is plain data: parsing, ordering and display of
//! Boost release versions, the supported compiler toolsets and the target
//! address model. No IO happens here.

pub mod arch;
pub mod toolset;
pub mod version;

// Re-exports
pub use arch::*;
pub use toolset::*;
pub use version::*;

/// Name of the provisioned library, as it appears in archive, source
/// directory and library file names (`boost_1_60_0`, `libboost_system.so`).
pub const LIB_NAME: &str = "boost";

/// Extension of the source archives published on the release pages.
pub const ARCHIVE_EXTENSION: &str = ".tar.bz2";
