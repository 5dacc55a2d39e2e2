//! Compiler toolsets understood by the Boost build driver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compiler identity prefixes and the toolset each one maps to.
const SUPPORTED: [(&str, Toolset); 2] = [("GCC", Toolset::Gcc), ("MSC", Toolset::Msvc)];

/// The host compiler identity does not map to a supported toolset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Could not determine compiler toolset from compiler identity '{identity}'. Supported: {supported}"
)]
pub struct UnsupportedCompiler {
    /// The compiler identity string that was inspected.
    pub identity: String,
    /// Human readable list of supported prefixes and their toolsets.
    pub supported: String,
}

/// Compiler toolset passed to the build driver as `toolset=<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolset {
    /// GNU Compiler Collection.
    Gcc,
    /// Microsoft Visual C++.
    Msvc,
}

impl Toolset {
    /// Map a compiler identity string (`"GCC 9.3.0"`, `"MSC v.1920 64 bit"`)
    /// to its toolset by prefix.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedCompiler`] naming the identity and the supported
    /// prefixes when no prefix matches.
    pub fn from_compiler_identity(identity: &str) -> Result<Self, UnsupportedCompiler> {
        SUPPORTED
            .iter()
            .find(|(prefix, _)| identity.starts_with(prefix))
            .map(|(_, toolset)| *toolset)
            .ok_or_else(|| UnsupportedCompiler {
                identity: identity.to_string(),
                supported: supported_list(),
            })
    }

    /// Toolset name as the build driver spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Msvc => "msvc",
        }
    }

    /// Whether this is the Visual C++ toolset.
    pub fn is_msvc(&self) -> bool {
        matches!(self, Self::Msvc)
    }
}

fn supported_list() -> String {
    SUPPORTED
        .iter()
        .map(|(prefix, toolset)| format!("{prefix} => {toolset}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Toolset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Toolset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcc" => Ok(Self::Gcc),
            "msvc" => Ok(Self::Msvc),
            _ => Err(format!("Unknown toolset: {s}")),
        }
    }
}
