//! Host toolchain facts, detected once at startup.
//!
//! Everything downstream that builds paths or command lines reads the
//! [`Host`] it was handed; nothing re-probes the machine.

use std::path::{Path, PathBuf};
use std::process::Command;

use boostup_schema::{AddressModel, Toolset};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::io::process::Invocation;

/// Compiler identity, toolset, bit width and runtime include directory of the build host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Host {
    /// Identity string the toolset was derived from (`GCC 9.3.0`).
    pub compiler: String,
    /// Toolset passed to the build driver.
    pub toolset: Toolset,
    /// Target address model.
    pub address_model: AddressModel,
    /// Language runtime headers forwarded as `include=`.
    pub runtime_include: Option<PathBuf>,
}

impl Host {
    /// Build a host description from an explicit compiler identity.
    pub fn from_identity(
        identity: &str,
        address_model: AddressModel,
        runtime_include: Option<PathBuf>,
    ) -> Result<Self> {
        let toolset = Toolset::from_compiler_identity(identity)?;
        Ok(Self {
            compiler: identity.to_string(),
            toolset,
            address_model,
            runtime_include,
        })
    }

    /// Detect the host, preferring explicit overrides over probing.
    pub fn detect(compiler: Option<&str>, runtime_include: Option<&Path>) -> Result<Self> {
        let identity = match compiler {
            Some(identity) => identity.to_string(),
            None => probe_compiler_identity(),
        };
        debug!(%identity, "compiler identity");

        let runtime_include = match runtime_include {
            Some(dir) => Some(dir.to_path_buf()),
            None => {
                let probed = probe_runtime_include();
                if probed.is_none() {
                    debug!("no Python interpreter found");
                }
                probed
            }
        };

        Self::from_identity(&identity, AddressModel::current(), runtime_include)
    }

    /// Command that bootstraps the build driver inside `source`.
    pub fn bootstrap_invocation(&self, source: &Path) -> Invocation {
        if self.toolset.is_msvc() {
            Invocation::new(source.join("bootstrap.bat"), source)
        } else {
            Invocation::new("bash", source).arg("bootstrap.sh")
        }
    }

    /// Location of the build driver produced by bootstrapping `source`.
    pub fn driver_path(&self, source: &Path) -> PathBuf {
        if self.toolset.is_msvc() {
            source.join("b2.exe")
        } else {
            source.join("b2")
        }
    }

    /// Fixed driver flags, before any caller arguments.
    pub fn driver_flags(&self) -> Vec<String> {
        let mut flags = vec![
            format!("toolset={}", self.toolset),
            format!("address-model={}", self.address_model),
        ];
        if let Some(include) = &self.runtime_include {
            flags.push(format!("include={}", include.display()));
        }
        flags.push("link=shared".to_string());
        flags
    }
}

/// Compiler identity of the default C compiler.
///
/// MSVC targets report `MSC`; elsewhere `cc --version` is parsed. Returns
/// `"unknown"` when no compiler can be run, which then fails toolset mapping.
pub fn probe_compiler_identity() -> String {
    if cfg!(target_env = "msvc") {
        return "MSC".to_string();
    }

    let Ok(cc) = which::which("cc") else {
        return "unknown".to_string();
    };
    match Command::new(cc).arg("--version").output() {
        Ok(output) if output.status.success() => {
            parse_compiler_identity(&String::from_utf8_lossy(&output.stdout))
        }
        _ => "unknown".to_string(),
    }
}

/// Turn `cc --version` output into an identity such as `GCC 9.3.0` or `Clang 12.0.0`.
pub fn parse_compiler_identity(version_output: &str) -> String {
    let first = version_output.lines().next().unwrap_or_default().trim();
    let tokens: Vec<&str> = first.split_whitespace().collect();

    let version = tokens
        .iter()
        .position(|t| *t == "version")
        .and_then(|i| tokens.get(i + 1))
        .or_else(|| {
            tokens
                .iter()
                .rev()
                .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))
        })
        .copied()
        .unwrap_or_default();

    if first.contains("clang") {
        format!("Clang {version}").trim_end().to_string()
    } else if first.contains("gcc")
        || first.contains("GCC")
        || version_output.contains("Free Software Foundation")
    {
        format!("GCC {version}").trim_end().to_string()
    } else {
        first.to_string()
    }
}

/// Include directory of the first Python interpreter on `PATH`.
pub fn probe_runtime_include() -> Option<PathBuf> {
    ["python3", "python"].iter().find_map(|name| {
        let python = which::which(name).ok()?;
        let output = Command::new(python)
            .args(["-c", "import sysconfig; print(sysconfig.get_path('include'))"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!dir.is_empty()).then(|| PathBuf::from(dir))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;

    fn gcc_host(runtime_include: Option<PathBuf>) -> Host {
        Host::from_identity("GCC 9.3.0", AddressModel::Bits64, runtime_include).unwrap()
    }

    #[test]
    fn test_identity_mapping() {
        assert_eq!(gcc_host(None).toolset, Toolset::Gcc);
        let msvc = Host::from_identity("MSC v.1920", AddressModel::Bits32, None).unwrap();
        assert_eq!(msvc.toolset, Toolset::Msvc);
    }

    #[test]
    fn test_unknown_identity_is_fatal() {
        let err = Host::from_identity("Clang 12", AddressModel::Bits64, None).unwrap_err();
        assert!(matches!(err, ProvisionError::UnsupportedCompiler(_)));
        assert!(err.to_string().contains("Clang 12"));
    }

    #[test]
    fn test_detect_with_overrides_does_not_probe() {
        let host = Host::detect(Some("GCC 13.2.0"), Some(Path::new("/usr/include/python3.12")))
            .unwrap();
        assert_eq!(host.compiler, "GCC 13.2.0");
        assert_eq!(
            host.runtime_include,
            Some(PathBuf::from("/usr/include/python3.12"))
        );
    }

    #[test]
    fn test_parse_gcc_version_output() {
        let out = "gcc (Ubuntu 9.3.0-17ubuntu1~20.04) 9.3.0\nCopyright (C) 2019 Free Software Foundation, Inc.\n";
        assert_eq!(parse_compiler_identity(out), "GCC 9.3.0");

        let out = "cc (GCC) 13.2.1 20231011 (Red Hat 13.2.1-4)\n";
        assert!(parse_compiler_identity(out).starts_with("GCC "));
    }

    #[test]
    fn test_parse_clang_version_output() {
        let out = "Apple clang version 14.0.0 (clang-1400.0.29.202)\nTarget: arm64-apple-darwin22.1.0\n";
        assert_eq!(parse_compiler_identity(out), "Clang 14.0.0");
    }

    #[test]
    fn test_bootstrap_invocation_per_toolset() {
        let src = Path::new("/cache/boost_1_60_0");

        let inv = gcc_host(None).bootstrap_invocation(src);
        assert_eq!(inv.program, PathBuf::from("bash"));
        assert_eq!(inv.arg_strings(), vec!["bootstrap.sh"]);
        assert_eq!(inv.cwd, src);

        let msvc = Host::from_identity("MSC", AddressModel::Bits64, None).unwrap();
        let inv = msvc.bootstrap_invocation(src);
        assert_eq!(inv.program, src.join("bootstrap.bat"));
        assert!(inv.args.is_empty());
        assert_eq!(msvc.driver_path(src), src.join("b2.exe"));
    }

    #[test]
    fn test_driver_flags() {
        let host = gcc_host(Some(PathBuf::from("/usr/include/python3.8")));
        assert_eq!(
            host.driver_flags(),
            vec![
                "toolset=gcc",
                "address-model=64",
                "include=/usr/include/python3.8",
                "link=shared",
            ]
        );
        assert_eq!(
            gcc_host(None).driver_flags(),
            vec!["toolset=gcc", "address-model=64", "link=shared"]
        );
    }
}
